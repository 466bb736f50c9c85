use super::filter::FilterStats;
use super::identity::IdentityAllocator;
use crate::clients::kitsu::AnimeNode;

/// Mutable state of one import run, owned by the driver and passed to each
/// stage explicitly.
#[derive(Debug, Default)]
pub struct PipelineContext {
    /// Cursor for the next page; empty before the first fetch.
    pub cursor: String,
    /// Accepted nodes waiting to be loaded.
    pub nodes: Vec<AnimeNode>,
    pub ids: IdentityAllocator,
    pub filter: FilterStats,
    pub pages_fetched: u32,
    /// Set once a page comes back without edges.
    pub exhausted: bool,
}

impl PipelineContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands the accumulated nodes to the caller, leaving the list empty.
    pub fn take_nodes(&mut self) -> Vec<AnimeNode> {
        std::mem::take(&mut self.nodes)
    }
}
