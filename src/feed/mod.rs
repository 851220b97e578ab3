pub mod controller;
pub mod lookup;

pub use controller::{FeedController, FeedSnapshot, FetchOutcome, DEFAULT_MAX_PAGES};
pub use lookup::{LookupError, MovieLookup};
