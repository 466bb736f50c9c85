use super::image::ImageAsset;
use crate::domain::{AgeRating, MediaId, Subtype};
use chrono::{DateTime, NaiveDate, Utc};

/// A transformed anime node, ready for the `anime` table.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub id: MediaId,
    pub slug: String,
    pub subtype: Subtype,
    /// `None` is written as SQL NULL, never defaulted.
    pub age_rating: Option<AgeRating>,
    pub age_rating_guide: Option<String>,
    pub episode_count: Option<i32>,
    pub episode_length: Option<i32>,
    pub total_length: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Locale map in `"locale"=>"value",` form.
    pub titles: String,
    /// Locale key of the preferred title; always a key of `titles`.
    pub canonical_title: String,
    pub original_locale: Option<String>,
    /// Locale-keyed JSON object.
    pub description: serde_json::Value,
    pub youtube_video_id: Option<String>,
    pub average_rating: Option<f64>,
    pub user_count: i32,
    pub popularity_rank: Option<i32>,
    pub rating_rank: Option<i32>,
    pub favorites_count: i32,
    pub tba: Option<String>,
    pub origin_languages: Vec<String>,
    pub origin_countries: Vec<String>,
    pub poster_image: Option<ImageAsset>,
    pub cover_image: Option<ImageAsset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaGenre {
    pub media_id: MediaId,
    pub genre_id: i32,
}
