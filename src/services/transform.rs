//! Pure conversions from raw Kitsu nodes to relational rows.
//!
//! Every function here works on a single node and never touches the
//! database; failures are reported as [`TransformError`] so the loader can
//! skip the offending row and keep going.

use crate::clients::kitsu::{
    AnimeNode, CategoryNode, CharacterEdgeNode, IdRef, ImageNode, LocaleMap,
};
use crate::domain::{
    AgeRating, CategoryId, CharacterId, CharacterRole, EnumTable, MEDIA_TYPE_ANIME, MediaId,
    Subtype, UnknownEnumValue,
};
use crate::models::image::STORE_TAG;
use crate::models::{
    Casting, Category, Character, ImageAsset, ImageDerivative, ImageMetadata, MediaCharacter,
    MediaRecord,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DATE_FORMAT: &str = "%Y-%m-%d";
const PREFERRED_LOCALE: &str = "en_jp";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error(transparent)]
    UnknownEnumValue(#[from] UnknownEnumValue),

    #[error("malformed timestamp {0:?}, expected YYYY-MM-DDTHH:MM:SSZ")]
    MalformedTimestamp(String),

    #[error("malformed date {0:?}, expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("no non-empty {0} to pick a canonical locale from")]
    NoTitles(&'static str),

    #[error("image url {0:?} is shorter than the storage prefix")]
    MalformedImageUrl(String),

    #[error("invalid {kind} id {value:?}")]
    InvalidId { kind: &'static str, value: String },
}

/// Locale map serialized for the `titles` column plus the chosen canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTitles {
    pub serialized: String,
    pub canonical: String,
}

/// Per-run settings the transformer needs from configuration.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub storage_prefix: String,
    pub casting_role: String,
    pub casting_language: String,
}

pub fn resolve_enum<T: EnumTable>(label: &str) -> Result<T, TransformError> {
    Ok(T::resolve(label)?)
}

/// Serializes the non-empty locales as `"locale"=>"value",` pairs and picks
/// the canonical key: `en_jp` when present, otherwise the first locale in
/// key order.
pub fn merge_titles(locales: &LocaleMap) -> Result<MergedTitles, TransformError> {
    let present: Vec<(&str, &str)> = locales
        .iter()
        .filter_map(|(locale, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (locale.as_str(), v))
        })
        .collect();

    let canonical = present
        .iter()
        .find(|(locale, _)| *locale == PREFERRED_LOCALE)
        .or_else(|| present.first())
        .map(|(locale, _)| (*locale).to_string())
        .ok_or(TransformError::NoTitles("titles"))?;

    let serialized = present
        .iter()
        .map(|(locale, value)| format!("\"{}\"=>\"{}\",", escape(locale), escape(value)))
        .collect();

    Ok(MergedTitles {
        serialized,
        canonical,
    })
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Flattens an upstream image into a stored asset. Derivatives are keyed by
/// each view's own `name`, so the order of `views` does not matter.
pub fn flatten_image(
    image: Option<&ImageNode>,
    storage_prefix: &str,
) -> Result<Option<ImageAsset>, TransformError> {
    let Some(image) = image else {
        return Ok(None);
    };

    let mut derivates = BTreeMap::new();
    for view in &image.views {
        derivates.insert(
            view.name.clone(),
            ImageDerivative {
                id: storage_id(&view.url, storage_prefix)?,
                storage: STORE_TAG.to_string(),
                metadata: ImageMetadata {
                    width: view.width,
                    height: view.height,
                    blurhash: None,
                },
            },
        );
    }

    Ok(Some(ImageAsset {
        id: storage_id(&image.original.url, storage_prefix)?,
        storage: STORE_TAG.to_string(),
        metadata: ImageMetadata {
            width: image.original.width,
            height: image.original.height,
            blurhash: image.blurhash.clone(),
        },
        derivates,
    }))
}

fn storage_id(url: &str, storage_prefix: &str) -> Result<String, TransformError> {
    url.get(storage_prefix.len()..)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TransformError::MalformedImageUrl(url.to_string()))
}

/// Strict `YYYY-MM-DDTHH:MM:SSZ` parse. Fractional seconds and offsets are rejected.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TransformError> {
    let malformed = || TransformError::MalformedTimestamp(value.to_string());

    if !has_shape(value, "dddd-dd-ddTdd:dd:ddZ") {
        return Err(malformed());
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|_| malformed())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, TransformError> {
    let malformed = || TransformError::MalformedDate(value.to_string());

    if !has_shape(value, "dddd-dd-dd") {
        return Err(malformed());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| malformed())
}

/// `d` matches an ASCII digit; any other pattern byte must match exactly.
fn has_shape(value: &str, pattern: &str) -> bool {
    value.len() == pattern.len()
        && value
            .bytes()
            .zip(pattern.bytes())
            .all(|(v, p)| if p == b'd' { v.is_ascii_digit() } else { v == p })
}

fn required_timestamp(
    value: Option<&str>,
    field: &'static str,
) -> Result<DateTime<Utc>, TransformError> {
    parse_timestamp(value.ok_or(TransformError::MissingField(field))?)
}

fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, TransformError> {
    value.map(parse_date).transpose()
}

/// Anime descriptions arrive either as a locale map or as bare English text.
fn locale_description(value: Option<&Value>) -> Result<Value, TransformError> {
    match value {
        Some(Value::Object(map)) => Ok(Value::Object(map.clone())),
        Some(Value::String(text)) => {
            let mut map = Map::new();
            map.insert("en".to_string(), Value::String(text.clone()));
            Ok(Value::Object(map))
        }
        _ => Err(TransformError::MissingField("description")),
    }
}

fn locale_json(locales: &LocaleMap) -> Value {
    let map: Map<String, Value> = locales
        .iter()
        .filter_map(|(locale, value)| {
            value
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| (locale.clone(), Value::String(v.clone())))
        })
        .collect();
    Value::Object(map)
}

fn english(locales: &LocaleMap) -> String {
    locales.get("en").cloned().flatten().unwrap_or_default()
}

fn parse_id(kind: &'static str, value: &str) -> Result<i32, TransformError> {
    value.trim().parse().map_err(|_| TransformError::InvalidId {
        kind,
        value: value.to_string(),
    })
}

pub fn genre_id(reference: &IdRef) -> Result<i32, TransformError> {
    parse_id("genre", &reference.id)
}

pub fn media_record(
    node: &AnimeNode,
    id: MediaId,
    options: &TransformOptions,
) -> Result<MediaRecord, TransformError> {
    let slug = node
        .slug
        .clone()
        .ok_or(TransformError::MissingField("slug"))?;
    let subtype: Subtype = resolve_enum(
        node.subtype
            .as_deref()
            .ok_or(TransformError::MissingField("subtype"))?,
    )?;
    let age_rating = node
        .age_rating
        .as_deref()
        .map(resolve_enum::<AgeRating>)
        .transpose()?;
    let titles = merge_titles(&node.titles.localized)?;

    Ok(MediaRecord {
        id,
        slug,
        subtype,
        age_rating,
        age_rating_guide: node.age_rating_guide.clone(),
        episode_count: node.episode_count,
        episode_length: node.episode_length,
        total_length: node.total_length,
        start_date: optional_date(node.start_date.as_deref())?,
        end_date: optional_date(node.end_date.as_deref())?,
        titles: titles.serialized,
        canonical_title: titles.canonical,
        original_locale: node.titles.original_locale.clone(),
        description: locale_description(node.description.as_ref())?,
        youtube_video_id: node.youtube_trailer_video_id.clone(),
        average_rating: node.average_rating,
        user_count: node.user_count.unwrap_or(0),
        popularity_rank: node.user_count_rank,
        rating_rank: node.average_rating_rank,
        favorites_count: node.favorites_count.unwrap_or(0),
        tba: node.tba.clone(),
        origin_languages: node.origin_languages.clone().unwrap_or_default(),
        origin_countries: node.origin_countries.clone().unwrap_or_default(),
        poster_image: flatten_image(node.poster_image.as_ref(), &options.storage_prefix)?,
        cover_image: flatten_image(node.banner_image.as_ref(), &options.storage_prefix)?,
        created_at: required_timestamp(node.created_at.as_deref(), "createdAt")?,
        updated_at: required_timestamp(node.updated_at.as_deref(), "updatedAt")?,
    })
}

pub fn character_record(
    edge: &CharacterEdgeNode,
    id: CharacterId,
    media_id: MediaId,
    options: &TransformOptions,
) -> Result<Character, TransformError> {
    let node = edge
        .character
        .as_ref()
        .ok_or(TransformError::MissingField("character"))?;
    let slug = node
        .slug
        .clone()
        .ok_or(TransformError::MissingField("character.slug"))?;
    let names = merge_titles(&node.names.localized).map_err(|_| TransformError::NoTitles("names"))?;
    let name = node
        .names
        .canonical
        .clone()
        .or_else(|| node.names.localized.get(&names.canonical).cloned().flatten())
        .ok_or(TransformError::MissingField("names.canonical"))?;

    Ok(Character {
        id,
        name,
        canonical_name: names.canonical,
        slug,
        names: locale_json(&node.names.localized),
        description: node
            .description
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())),
        image: flatten_image(node.image.as_ref(), &options.storage_prefix)?,
        primary_media_id: media_id,
        primary_media_type: MEDIA_TYPE_ANIME.to_string(),
        created_at: required_timestamp(node.created_at.as_deref(), "character.createdAt")?,
        updated_at: required_timestamp(node.updated_at.as_deref(), "character.updatedAt")?,
    })
}

pub fn character_link(
    edge: &CharacterEdgeNode,
    character_id: CharacterId,
    media_id: MediaId,
) -> Result<MediaCharacter, TransformError> {
    let role: CharacterRole =
        resolve_enum(edge.role.as_deref().ok_or(TransformError::MissingField("role"))?)?;

    Ok(MediaCharacter {
        media_id,
        media_type: MEDIA_TYPE_ANIME.to_string(),
        character_id,
        role,
        created_at: required_timestamp(edge.created_at.as_deref(), "createdAt")?,
        updated_at: required_timestamp(edge.updated_at.as_deref(), "updatedAt")?,
    })
}

#[must_use]
pub fn casting_record(link: &MediaCharacter, options: &TransformOptions) -> Casting {
    Casting {
        id: link.character_id.value(),
        media_id: link.media_id,
        character_id: link.character_id,
        role: options.casting_role.clone(),
        voice_actor: true,
        featured: true,
        language: options.casting_language.clone(),
        media_type: link.media_type.clone(),
        created_at: link.created_at,
        updated_at: link.updated_at,
    }
}

pub fn category_record(node: &CategoryNode, id: CategoryId) -> Result<Category, TransformError> {
    let parent_id = node
        .parent
        .as_ref()
        .map(|parent| parse_id("parent category", &parent.id))
        .transpose()?;

    Ok(Category {
        id,
        title: english(&node.title),
        slug: node.slug.clone(),
        parent_id,
        nsfw: node.is_nsfw,
        child_count: node.children.total_count,
        description: Value::String(english(&node.description)),
        created_at: required_timestamp(node.created_at.as_deref(), "createdAt")?,
        updated_at: required_timestamp(node.updated_at.as_deref(), "updatedAt")?,
    })
}
