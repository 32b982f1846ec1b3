pub mod cache;
pub mod charging;
pub mod contiguous;
pub mod error;
pub mod period;
pub mod planner;
pub mod provider;
pub mod series;
pub mod slot;
pub mod store;
pub mod summary;
pub mod time;
pub mod vehicle;
pub mod window;
