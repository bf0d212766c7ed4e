pub mod local;
pub mod remote;
pub mod store;

pub use store::{EventSource, VenueStore};
