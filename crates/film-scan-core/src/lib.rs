pub mod filter;
pub mod history;
pub mod merge;
pub mod normalize;
pub mod resolve;
pub mod scan;
pub mod store;

pub use filter::{group_rows, FilmGroup, OfferFilter};
pub use history::HistoryStore;
pub use merge::{merge_incremental, prune_rows};
pub use normalize::normalize_provider;
pub use resolve::resolve_unwatched;
pub use scan::{ScanMode, ScanOptions, ScanOrchestrator, ScanResult};
pub use store::OfferStore;
