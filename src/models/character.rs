use super::image::ImageAsset;
use crate::domain::{CharacterId, CharacterRole, MediaId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Locale key of the preferred entry in `names`.
    pub canonical_name: String,
    pub slug: String,
    pub names: serde_json::Value,
    pub description: serde_json::Value,
    pub image: Option<ImageAsset>,
    /// Media the character was first encountered on.
    pub primary_media_id: MediaId,
    pub primary_media_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row for both `anime_characters` and `media_characters`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCharacter {
    pub media_id: MediaId,
    pub media_type: String,
    pub character_id: CharacterId,
    pub role: CharacterRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Casting {
    pub id: i32,
    pub media_id: MediaId,
    pub character_id: CharacterId,
    pub role: String,
    pub voice_actor: bool,
    pub featured: bool,
    pub language: String,
    pub media_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
