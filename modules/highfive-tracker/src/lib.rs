pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod metrics;
pub mod notify;
pub mod people;
pub mod tracker;

pub use fetcher::{fetch_all, FetchError, ListingSource};
pub use filter::{InterestFilter, InterestMatch};
pub use tracker::{RunStats, Tracker, TrackerSettings};
