pub mod reconcile;
pub mod venues;
