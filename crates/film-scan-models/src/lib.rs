pub mod film;
pub mod metadata;
pub mod offer;

pub use film::FilmRecord;
pub use metadata::{FilmMetadata, PLACEHOLDER_POSTER_URL};
pub use offer::OfferRow;
