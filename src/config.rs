use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use log::{info, warn};

pub const DEFAULT_POLL_SECS: u64 = 5;
pub const DEFAULT_VENUES_TABLE: &str = "venues";
pub const DEFAULT_EVENTS_TABLE: &str = "event_requests";

#[derive(Debug)]
pub enum ConfigError {
    /// Required variable is unset or blank
    Missing(&'static str),
    /// Variable is set but does not parse
    Invalid { key: &'static str, message: String },
    /// No platform data directory to default the cache path to
    NoDataDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, message } => write!(f, "Invalid {}: {}", key, message),
            ConfigError::NoDataDir => write!(
                f,
                "No data directory available; set EVENTDESK_CACHE_PATH"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub access_token: String,
    pub poll_interval: Duration,
    pub cache_path: PathBuf,
    pub venues_table: String,
    pub events_table: String,
}

impl Config {
    /// Load from `EVENTDESK_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let supabase_url =
            var("EVENTDESK_SUPABASE_URL").ok_or(ConfigError::Missing("EVENTDESK_SUPABASE_URL"))?;
        let supabase_anon_key = var("EVENTDESK_SUPABASE_ANON_KEY")
            .ok_or(ConfigError::Missing("EVENTDESK_SUPABASE_ANON_KEY"))?;

        let access_token = var("EVENTDESK_ACCESS_TOKEN").unwrap_or_else(|| {
            info!("EVENTDESK_ACCESS_TOKEN not set, using the anon key");
            supabase_anon_key.clone()
        });

        let poll_secs: u64 = parse_or_default(
            "EVENTDESK_POLL_SECS",
            var("EVENTDESK_POLL_SECS"),
            DEFAULT_POLL_SECS,
        )?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "EVENTDESK_POLL_SECS",
                message: "must be at least 1".to_string(),
            });
        }

        let cache_path = match var("EVENTDESK_CACHE_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_cache_path()?,
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            access_token,
            poll_interval: Duration::from_secs(poll_secs),
            cache_path,
            venues_table: var("EVENTDESK_VENUES_TABLE")
                .unwrap_or_else(|| DEFAULT_VENUES_TABLE.to_string()),
            events_table: var("EVENTDESK_EVENTS_TABLE")
                .unwrap_or_else(|| DEFAULT_EVENTS_TABLE.to_string()),
        })
    }
}

fn parse_or_default<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn default_cache_path() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("eventdesk").join("cache.db"))
        .ok_or(ConfigError::NoDataDir)
}
