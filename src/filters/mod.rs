pub mod catalog;
pub mod state;
pub mod store;

pub use state::{FilterKey, FilterState};
pub use store::FilterStore;
