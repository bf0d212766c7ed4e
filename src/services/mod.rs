pub mod poller;
pub mod reconcile;
pub mod venues;
