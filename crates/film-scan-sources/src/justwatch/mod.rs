pub mod client;
pub mod locale;
pub mod matcher;

pub use client::JustWatchClient;
