//! Ordered, per-row-isolated writes of transformed entities.
//!
//! Parents are written before their children. A failing row is recorded as
//! a [`Skip`] and the loop moves on; nothing here aborts the run.

use super::identity::IdentityAllocator;
use super::transform::{self, TransformError, TransformOptions};
use crate::clients::kitsu::{AnimeNode, CategoryNode, CharacterEdgeNode};
use crate::db::Store;
use crate::domain::{CharacterId, MediaId};
use crate::models::MediaGenre;
use sea_orm::DbErr;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Media,
    Genre,
    Character,
    AnimeCharacter,
    MediaCharacter,
    Casting,
    Category,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Media => "media",
            Self::Genre => "genre link",
            Self::Character => "character",
            Self::AnimeCharacter => "anime character link",
            Self::MediaCharacter => "media character link",
            Self::Casting => "casting",
            Self::Category => "category",
        })
    }
}

/// A row that was not written, and why.
#[derive(Debug)]
pub struct Skip {
    pub entity: EntityKind,
    pub identifier: String,
    pub error: LoadError,
}

impl Skip {
    fn new(entity: EntityKind, identifier: impl Into<String>, error: impl Into<LoadError>) -> Self {
        Self {
            entity,
            identifier: identifier.into(),
            error: error.into(),
        }
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub media_id: MediaId,
    /// Whether the media row itself was written.
    pub written: bool,
    pub genres_written: usize,
    /// Characters whose whole row chain was written.
    pub characters_written: usize,
    /// Ids of every `characters` row written for this media.
    pub character_ids: Vec<CharacterId>,
    pub skips: Vec<Skip>,
}

impl LoadOutcome {
    fn new(media_id: MediaId) -> Self {
        Self {
            media_id,
            written: false,
            genres_written: 0,
            characters_written: 0,
            character_ids: Vec::new(),
            skips: Vec::new(),
        }
    }

    fn skip(&mut self, skip: Skip) {
        log_skip(&skip);
        self.skips.push(skip);
    }
}

#[derive(Debug, Default)]
pub struct CategoryOutcome {
    pub written: usize,
    pub skips: Vec<Skip>,
}

fn log_skip(skip: &Skip) {
    warn!(
        entity = %skip.entity,
        id = %skip.identifier,
        error = %skip.error,
        "Skipped {}",
        skip.entity
    );
}

pub struct RelationalLoader<'a> {
    store: &'a Store,
    options: TransformOptions,
}

impl<'a> RelationalLoader<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, options: TransformOptions) -> Self {
        Self { store, options }
    }

    /// Loads one accepted anime node with its genre links and cast.
    ///
    /// The media id is taken before anything is written. If the media row
    /// fails, none of its children are attempted.
    pub async fn load(&self, node: &AnimeNode, ids: &mut IdentityAllocator) -> LoadOutcome {
        let media_id = ids.next_media_id();
        let mut outcome = LoadOutcome::new(media_id);
        let display_id = node.display_id();

        let record = match transform::media_record(node, media_id, &self.options) {
            Ok(record) => record,
            Err(e) => {
                outcome.skip(Skip::new(EntityKind::Media, display_id, e));
                return outcome;
            }
        };

        if let Err(e) = self.store.insert_media(&record).await {
            outcome.skip(Skip::new(EntityKind::Media, display_id, e));
            return outcome;
        }
        outcome.written = true;

        for genre in &node.categories.nodes {
            let result = match transform::genre_id(genre) {
                Ok(genre_id) => self
                    .store
                    .insert_media_genre(MediaGenre { media_id, genre_id })
                    .await
                    .map_err(LoadError::from),
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(()) => outcome.genres_written += 1,
                Err(e) => outcome.skip(Skip::new(
                    EntityKind::Genre,
                    format!("{display_id} -> {}", genre.id),
                    e,
                )),
            }
        }

        for edge in &node.characters.nodes {
            let character_id = ids.next_character_id();
            match self.load_character(edge, character_id, media_id).await {
                Ok(()) => {
                    outcome.characters_written += 1;
                    outcome.character_ids.push(character_id);
                }
                Err((skip, inserted)) => {
                    if inserted {
                        outcome.character_ids.push(character_id);
                    }
                    outcome.skip(skip);
                }
            }
        }

        debug!(
            media_id = %media_id,
            genres = outcome.genres_written,
            characters = outcome.characters_written,
            "Loaded {}",
            display_id
        );

        outcome
    }

    /// Writes the character row, then its join rows, then the casting.
    /// The first failure stops the chain; the flag reports whether the
    /// character row itself made it in.
    async fn load_character(
        &self,
        edge: &CharacterEdgeNode,
        character_id: CharacterId,
        media_id: MediaId,
    ) -> Result<(), (Skip, bool)> {
        let identifier = edge
            .character
            .as_ref()
            .map(|c| c.slug.clone().unwrap_or_else(|| c.id.clone()))
            .unwrap_or_else(|| format!("#{character_id}"));
        let fail = |entity, error: LoadError, inserted| {
            (Skip::new(entity, identifier.clone(), error), inserted)
        };

        let character = transform::character_record(edge, character_id, media_id, &self.options)
            .map_err(|e| fail(EntityKind::Character, e.into(), false))?;
        self.store
            .insert_character(&character)
            .await
            .map_err(|e| fail(EntityKind::Character, e.into(), false))?;

        let link = transform::character_link(edge, character_id, media_id)
            .map_err(|e| fail(EntityKind::AnimeCharacter, e.into(), true))?;
        self.store
            .insert_anime_character(&link)
            .await
            .map_err(|e| fail(EntityKind::AnimeCharacter, e.into(), true))?;
        self.store
            .insert_media_character(&link)
            .await
            .map_err(|e| fail(EntityKind::MediaCharacter, e.into(), true))?;

        let casting = transform::casting_record(&link, &self.options);
        self.store
            .insert_casting(&casting)
            .await
            .map_err(|e| fail(EntityKind::Casting, e.into(), true))?;

        Ok(())
    }

    /// One-shot category pass. Each category gets the next category id
    /// whether or not its row is written.
    pub async fn load_categories(
        &self,
        nodes: &[CategoryNode],
        ids: &mut IdentityAllocator,
    ) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::default();

        for node in nodes {
            let id = ids.next_category_id();
            let result = match transform::category_record(node, id) {
                Ok(category) => self
                    .store
                    .insert_category(&category)
                    .await
                    .map_err(LoadError::from),
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(()) => {
                    debug!(id = %id, "Added category {}", node.slug);
                    outcome.written += 1;
                }
                Err(e) => {
                    let skip = Skip::new(EntityKind::Category, node.slug.clone(), e);
                    log_skip(&skip);
                    outcome.skips.push(skip);
                }
            }
        }

        outcome
    }
}
