pub mod context;
pub mod fetcher;
pub mod filter;
pub mod identity;
pub mod import;
pub mod loader;
pub mod transform;

pub use context::PipelineContext;
pub use fetcher::PageFetcher;
pub use filter::{FilterStats, Rejection};
pub use identity::IdentityAllocator;
pub use import::{ImportError, ImportPipeline, ImportSummary};
pub use loader::{EntityKind, LoadError, LoadOutcome, RelationalLoader, Skip};
pub use transform::{TransformError, TransformOptions};
