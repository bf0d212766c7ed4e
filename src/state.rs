use crate::config::Config;
use crate::database::local::{init_cache_db, VenueCache};
use crate::database::remote::common::SupabaseClient;
use crate::database::remote::RemoteStore;

/// Everything the commands need, built once at startup
pub struct AppState {
    pub remote: RemoteStore,
    pub cache: VenueCache,
    pub config: Config,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self, String> {
        let db = init_cache_db(&config.cache_path).await?;
        let client = SupabaseClient::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
        );
        let remote = RemoteStore::new(
            client,
            config.access_token.clone(),
            config.venues_table.clone(),
            config.events_table.clone(),
        );

        Ok(Self {
            remote,
            cache: VenueCache::new(db.0),
            config,
        })
    }
}
