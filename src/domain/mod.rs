//! Domain primitives for the catalog import.
//!
//! Surrogate keys are wrapped in newtypes so a media id can never be passed
//! where a character id is expected. The upstream enumerations live in
//! [`kinds`] as closed variant types with exhaustive label tables.

pub mod kinds;

pub use kinds::{AgeRating, CharacterRole, EnumTable, Subtype, UnknownEnumValue};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

surrogate_id!(
    /// Surrogate key of an `anime` row. Allocated by the importer, never
    /// taken from upstream.
    MediaId
);

surrogate_id!(
    /// Surrogate key of a `characters` row. Counts independently of [`MediaId`].
    CharacterId
);

surrogate_id!(
    /// Surrogate key of a `categories` row.
    CategoryId
);

/// Media type tag written to polymorphic join tables.
pub const MEDIA_TYPE_ANIME: &str = "Anime";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_conversions() {
        let id = MediaId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(MediaId::from(42), id);
    }

    #[test]
    fn ids_are_ordered() {
        assert!(CharacterId::new(1) < CharacterId::new(2));
        assert_eq!(CategoryId::default().value(), 0);
    }

    #[test]
    fn id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&CharacterId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: CharacterId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CharacterId::new(7));
    }
}
