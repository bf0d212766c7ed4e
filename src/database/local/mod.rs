pub mod cache;
pub mod database;

pub use cache::{CacheError, VenueCache, SHARED_VENUES_SLOT};
pub use database::{init_cache_db, init_memory_cache_db, CacheDb};
