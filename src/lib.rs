//! Venue reconciliation and venue management for school event dashboards.
//!
//! Venues come from three places: the hosted `venues` table, a local cache of the last
//! reconciled list, and approved event requests that name a venue nobody has entered
//! yet. [`services::reconcile`] folds them into one list with unique names.
//! [`services::venues`] handles explicit create/update/delete from the dashboard.

pub mod commands;
pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod state;
