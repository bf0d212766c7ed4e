pub mod events;
pub mod venues;
