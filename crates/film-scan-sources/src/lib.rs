pub mod error;
pub mod justwatch;
pub mod letterboxd;
pub mod progress;
pub mod tmdb;
pub mod traits;

pub use error::SourceError;
pub use justwatch::JustWatchClient;
pub use letterboxd::LetterboxdClient;
pub use progress::ProgressTracker;
pub use tmdb::TmdbClient;
pub use traits::{FilmListSource, MetadataSource, OfferSource, TitleMatch};
