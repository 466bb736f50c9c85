use super::context::PipelineContext;
use super::filter;
use crate::clients::kitsu::KitsuError;
use crate::clients::{AnimePage, CatalogSource};
use tracing::{debug, info};

/// Pulls cursor-paginated anime pages, one after another.
pub struct PageFetcher<'a, S: CatalogSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: CatalogSource + ?Sized> PageFetcher<'a, S> {
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    pub async fn fetch_page(&self, cursor: &str) -> Result<AnimePage, KitsuError> {
        self.source.fetch_anime_page(cursor).await
    }

    /// Fetches up to `target` pages into `ctx`, filtering each node as it
    /// arrives. Stops early when the catalog runs out of edges.
    ///
    /// A failed request is returned as-is: the cursor cannot be trusted past
    /// that point, so the caller must not keep paging.
    pub async fn fetch_pages(
        &self,
        ctx: &mut PipelineContext,
        target: u32,
    ) -> Result<(), KitsuError> {
        for _ in 0..target {
            if ctx.exhausted {
                break;
            }

            let page = self.fetch_page(&ctx.cursor).await?;
            ctx.pages_fetched += 1;

            let received = page.nodes.len();
            let mut accepted = 0usize;
            for node in page.nodes {
                let verdict = filter::rejection(&node);
                ctx.filter.record(verdict);
                match verdict {
                    None => {
                        ctx.nodes.push(node);
                        accepted += 1;
                    }
                    Some(reason) => debug!("Rejected anime {}: {}", node.display_id(), reason),
                }
            }

            info!(
                page = ctx.pages_fetched,
                received,
                accepted,
                "Fetched {} anime",
                accepted
            );

            match page.next_cursor {
                Some(cursor) => ctx.cursor = cursor,
                None => {
                    info!("Reached the end of the anime catalog");
                    ctx.exhausted = true;
                }
            }
        }

        Ok(())
    }
}
