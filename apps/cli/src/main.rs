use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

use backend::repositories::{
    ArticleRepository, BookingRepository, EventRepository, TeamRepository, VenueRepository,
};
use backend::{AuthClient, ProfileClient, RestClient, SessionFile};
use common::config::BackendConfig;
use session::SessionManager;

use crate::commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; default to warnings so log lines do not fight
    // the interactive prompt
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting SportsSpot client");

    let config = BackendConfig::from_env()?;

    let store = SessionFile::new(SessionFile::default_location());
    let auth = AuthClient::new(config.clone(), Some(store))?;
    let rest = RestClient::new(config, auth.sessions())?;

    let profiles = ProfileClient::new(rest.clone());
    let manager = SessionManager::start(Arc::new(auth), Arc::new(profiles.clone()));

    let app = App {
        manager,
        profiles,
        venues: VenueRepository::new(rest.clone()),
        bookings: BookingRepository::new(rest.clone()),
        teams: TeamRepository::new(rest.clone()),
        events: EventRepository::new(rest.clone()),
        articles: ArticleRepository::new(rest),
    };

    commands::run(app).await
}
