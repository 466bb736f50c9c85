//! Upstream enumerations and their integer codes.
//!
//! Kitsu reports these as upper-case string labels; the relational schema
//! stores the integer code. Any label missing from a table is an
//! [`UnknownEnumValue`], never a silent default.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {label:?}")]
pub struct UnknownEnumValue {
    pub kind: &'static str,
    pub label: String,
}

/// A closed enumeration with a fixed label table.
pub trait EnumTable: Sized + Copy + 'static {
    const KIND: &'static str;
    const TABLE: &'static [(&'static str, Self)];

    fn code(self) -> i32;

    fn resolve(label: &str) -> Result<Self, UnknownEnumValue> {
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| *value)
            .ok_or_else(|| UnknownEnumValue {
                kind: Self::KIND,
                label: label.to_string(),
            })
    }

    fn label(self) -> &'static str
    where
        Self: PartialEq,
    {
        Self::TABLE
            .iter()
            .find(|(_, value)| *value == self)
            .map_or("", |(name, _)| name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    Tv,
    Special,
    Ova,
    Ona,
    Movie,
    Music,
}

impl EnumTable for Subtype {
    const KIND: &'static str = "subtype";
    const TABLE: &'static [(&'static str, Self)] = &[
        ("TV", Self::Tv),
        ("SPECIAL", Self::Special),
        ("OVA", Self::Ova),
        ("ONA", Self::Ona),
        ("MOVIE", Self::Movie),
        ("MUSIC", Self::Music),
    ];

    fn code(self) -> i32 {
        match self {
            Self::Tv => 0,
            Self::Special => 1,
            Self::Ova => 2,
            Self::Ona => 3,
            Self::Movie => 4,
            Self::Music => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeRating {
    G,
    Pg,
    R,
    R18,
}

impl EnumTable for AgeRating {
    const KIND: &'static str = "age rating";
    const TABLE: &'static [(&'static str, Self)] = &[
        ("G", Self::G),
        ("PG", Self::Pg),
        ("R", Self::R),
        ("R18", Self::R18),
    ];

    fn code(self) -> i32 {
        match self {
            Self::G => 0,
            Self::Pg => 1,
            Self::R => 2,
            Self::R18 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterRole {
    Main,
    Recurring,
    Background,
    Cameo,
}

impl EnumTable for CharacterRole {
    const KIND: &'static str = "character role";
    const TABLE: &'static [(&'static str, Self)] = &[
        ("MAIN", Self::Main),
        ("RECURRING", Self::Recurring),
        ("BACKGROUND", Self::Background),
        ("CAMEO", Self::Cameo),
    ];

    fn code(self) -> i32 {
        match self {
            Self::Main => 0,
            Self::Recurring => 1,
            Self::Background => 2,
            Self::Cameo => 3,
        }
    }
}

impl fmt::Display for CharacterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
