// Remote database operations against the hosted Supabase project
//
// All operations use the Supabase REST API (PostgREST).
//
// Key concepts:
// - venues are matched by their unique `name` when upserting
// - venues are never hard-deleted; `is_active = false` hides them
// - event requests are read-only from this side

pub mod common;

pub mod events;
pub mod venues;

use common::SupabaseClient;

/// Supabase-backed implementation of the venue and event seams
pub struct RemoteStore {
    client: SupabaseClient,
    access_token: String,
    venues_table: String,
    events_table: String,
}

impl RemoteStore {
    pub fn new(
        client: SupabaseClient,
        access_token: String,
        venues_table: String,
        events_table: String,
    ) -> Self {
        Self {
            client,
            access_token,
            venues_table,
            events_table,
        }
    }
}
