//! End-to-end import run: categories, then paging, then loading.

use super::context::PipelineContext;
use super::fetcher::PageFetcher;
use super::filter::FilterStats;
use super::loader::{LoadOutcome, RelationalLoader, Skip};
use super::transform::TransformOptions;
use crate::clients::CatalogSource;
use crate::clients::kitsu::KitsuError;
use crate::config::Config;
use crate::db::Store;
use crate::domain::MediaId;
use thiserror::Error;
use tracing::{info, warn};

/// Failures that end a run. Row-level failures never surface here; they are
/// collected as skips in the [`ImportSummary`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read from Kitsu: {0}")]
    Source(#[from] KitsuError),
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub pages_fetched: u32,
    pub filter: FilterStats,
    pub categories_written: usize,
    /// Media ids handed out, including ones whose row failed.
    pub media_attempted: usize,
    /// Media rows written.
    pub imported: usize,
    pub genres_written: usize,
    pub characters_written: usize,
    pub media_ids: Vec<MediaId>,
    pub skips: Vec<Skip>,
}

impl ImportSummary {
    fn absorb(&mut self, outcome: LoadOutcome) {
        self.media_attempted += 1;
        if outcome.written {
            self.imported += 1;
            self.media_ids.push(outcome.media_id);
        }
        self.genres_written += outcome.genres_written;
        self.characters_written += outcome.characters_written;
        self.skips.extend(outcome.skips);
    }

    pub fn log(&self) {
        info!(
            pages = self.pages_fetched,
            accepted = self.filter.accepted,
            missing_description = self.filter.missing_description,
            missing_age_rating = self.filter.missing_age_rating,
            missing_dates = self.filter.missing_dates,
            categories = self.categories_written,
            genres = self.genres_written,
            characters = self.characters_written,
            skipped_rows = self.skips.len(),
            "Import finished: {} of {} anime written",
            self.imported,
            self.media_attempted
        );
    }
}

pub struct ImportPipeline<'a, S: CatalogSource + ?Sized> {
    source: &'a S,
    store: &'a Store,
    options: TransformOptions,
    pages: u32,
    import_categories: bool,
}

impl<'a, S: CatalogSource + ?Sized> ImportPipeline<'a, S> {
    pub fn new(source: &'a S, store: &'a Store, config: &Config) -> Self {
        Self {
            source,
            store,
            options: TransformOptions {
                storage_prefix: config.kitsu.storage_prefix.clone(),
                casting_role: config.import.casting_role.clone(),
                casting_language: config.import.casting_language.clone(),
            },
            pages: config.import.pages,
            import_categories: config.import.import_categories,
        }
    }

    /// Runs one import against `ctx`.
    ///
    /// Paging finishes before any row is written, so a failed fetch leaves
    /// the anime tables untouched.
    pub async fn run(&self, ctx: &mut PipelineContext) -> Result<ImportSummary, ImportError> {
        let loader = RelationalLoader::new(self.store, self.options.clone());
        let mut summary = ImportSummary::default();

        if self.import_categories {
            let list = self.source.fetch_categories().await?;
            info!(
                total = ?list.total_count,
                received = list.nodes.len(),
                "Importing categories"
            );
            let outcome = loader.load_categories(&list.nodes, &mut ctx.ids).await;
            summary.categories_written = outcome.written;
            summary.skips.extend(outcome.skips);
        }

        PageFetcher::new(self.source)
            .fetch_pages(ctx, self.pages)
            .await
            .inspect_err(|e| warn!(page = ctx.pages_fetched + 1, "Paging aborted: {e}"))?;

        summary.pages_fetched = ctx.pages_fetched;
        summary.filter = ctx.filter;

        for node in ctx.take_nodes() {
            let outcome = loader.load(&node, &mut ctx.ids).await;
            summary.absorb(outcome);
        }

        summary.log();
        Ok(summary)
    }
}
