pub mod kitsu;

use async_trait::async_trait;
use kitsu::{AnimeNode, CategoryNode, KitsuError};

/// One page of the anime connection.
#[derive(Debug, Clone, Default)]
pub struct AnimePage {
    /// Cursor of the last edge, or `None` when the page had no edges.
    pub next_cursor: Option<String>,
    pub nodes: Vec<AnimeNode>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryList {
    pub total_count: Option<i64>,
    pub nodes: Vec<CategoryNode>,
}

/// Upstream catalog the import pipeline reads from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the page after `cursor`. An empty cursor means the first page.
    async fn fetch_anime_page(&self, cursor: &str) -> Result<AnimePage, KitsuError>;

    /// Fetches the bounded category list in one request.
    async fn fetch_categories(&self) -> Result<CategoryList, KitsuError>;
}
