use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use eventdesk_lib::commands::{reconcile, venues};
use eventdesk_lib::config::Config;
use eventdesk_lib::models::venues::{Provenance, VenueDraft, VenueStatus};
use eventdesk_lib::state::AppState;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Reconcile and manage venues for the school events dashboard")]
#[command(version)]
struct Cli {
    /// Seconds between reconciliation passes when polling
    #[arg(
        long,
        global = true,
        env = "EVENTDESK_POLL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_secs: Option<u64>,

    /// Local cache database path
    #[arg(long, global = true, env = "EVENTDESK_CACHE_PATH")]
    cache_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass and print the outcome as JSON
    Reconcile,

    /// Reconcile on the polling interval until Ctrl-C
    Poll,

    /// Print active venues
    List,

    /// Create a venue, or update the existing one with the same name
    Create {
        #[command(flatten)]
        form: VenueForm,
    },

    /// Overwrite a venue's details
    Update {
        id: String,
        #[command(flatten)]
        form: VenueForm,
    },

    /// Change a venue's booking status
    Status {
        id: String,
        #[arg(value_enum)]
        status: StatusArg,
        #[arg(long = "as", value_enum, default_value = "admin")]
        actor: ActorArg,
    },

    /// Deactivate a venue
    Delete {
        id: String,
        #[arg(long = "as", value_enum, default_value = "admin")]
        actor: ActorArg,
    },

    /// Inspect or reset the local venue cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cached venue list
    Show,
    /// Clear the cached venue list
    Invalidate,
    /// Reload the cache from the venues table
    Refresh,
}

#[derive(clap::Args)]
struct VenueForm {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    capacity: i64,
    #[arg(long)]
    description: Option<String>,
    /// Repeat for each amenity
    #[arg(long = "amenity")]
    amenities: Vec<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long, value_enum, default_value = "available")]
    status: StatusArg,
    #[arg(long = "as", value_enum, default_value = "admin")]
    actor: ActorArg,
}

impl VenueForm {
    fn into_parts(self) -> (Provenance, VenueDraft) {
        let draft = VenueDraft {
            name: self.name,
            location: self.location,
            capacity: self.capacity,
            description: self.description,
            amenities: self.amenities,
            image_reference: self.image,
            status: self.status.into(),
        };
        (self.actor.into(), draft)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Available,
    Booked,
    Maintenance,
}

impl From<StatusArg> for VenueStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Available => VenueStatus::Available,
            StatusArg::Booked => VenueStatus::Booked,
            StatusArg::Maintenance => VenueStatus::Maintenance,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ActorArg {
    Admin,
    Organizer,
    User,
}

impl From<ActorArg> for Provenance {
    fn from(arg: ActorArg) -> Self {
        match arg {
            ActorArg::Admin => Provenance::Admin,
            ActorArg::Organizer => Provenance::Organizer,
            ActorArg::User => Provenance::User,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to encode output: {}", e))?;
    println!("{}", text);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = Config::load().map_err(|e| e.to_string())?;
    if let Some(secs) = cli.poll_secs {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(path) = cli.cache_path {
        config.cache_path = path;
    }

    let state = AppState::init(config).await?;

    match cli.command {
        Commands::Reconcile => print_json(&reconcile::reconcile_venues(&state).await),
        Commands::Poll => {
            info!(
                "Polling every {}s, cache at {}",
                state.config.poll_interval.as_secs(),
                state.config.cache_path.display()
            );
            reconcile::poll_venues(&state, shutdown_signal(), |outcome| {
                info!(
                    "{} venues (baseline {:?}, persisted {:?})",
                    outcome.venues.len(),
                    outcome.baseline,
                    outcome.persisted
                );
            })
            .await;
            Ok(())
        }
        Commands::List => print_json(&venues::list_venues(&state).await?),
        Commands::Create { form } => {
            let (actor, draft) = form.into_parts();
            print_json(&venues::create_venue(&state, actor, draft).await?)
        }
        Commands::Update { id, form } => {
            let (actor, draft) = form.into_parts();
            print_json(&venues::update_venue(&state, actor, &id, draft).await?)
        }
        Commands::Status { id, status, actor } => print_json(
            &venues::set_venue_status(&state, actor.into(), &id, status.into()).await?,
        ),
        Commands::Delete { id, actor } => {
            venues::delete_venue(&state, actor.into(), &id).await?;
            println!("Deactivated venue {}", id);
            Ok(())
        }
        Commands::Cache { action } => match action {
            CacheAction::Show => print_json(&reconcile::show_cached_venues(&state).await?),
            CacheAction::Invalidate => {
                reconcile::invalidate_cache(&state).await?;
                println!("Venue cache cleared");
                Ok(())
            }
            CacheAction::Refresh => {
                let count = reconcile::refresh_cache(&state).await?;
                println!("Cached {} venues", count);
                Ok(())
            }
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
