#[macro_use]
extern crate log;

use std::sync::Arc;

use clap::Parser;

use hondana::domain::entities::tracker::TrackerType;
use hondana::domain::services::library::LibraryService;
use hondana::domain::services::tracker::TrackerService;
use hondana::infrastructure::config::Config;
use hondana::infrastructure::credential::TokenFileStore;
use hondana::infrastructure::repositories::library::LibraryRepositoryImpl;
use hondana::infrastructure::repositories::tracking::TrackingClientImpl;
use hondana::infrastructure::trackers::TrackerRegistry;
use hondana::presentation::ServerBuilder;
use hondana::presentation::rest::validate::CallbackSettings;
use hondana_tracker::{AniList, CredentialStore, MyAnimeList};

#[derive(Parser)]
struct Opts {
    /// Path to config file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let mut log_builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        if let Ok(level) = std::env::var("HONDANA_LOG") {
            log_builder.parse_filters(&format!("hondana={level},hondana_tracker={level}"));
        }
    }
    log_builder.init();

    let opts = Opts::parse();
    let config = Config::open(opts.config)?;

    let tokens = Arc::new(TokenFileStore::open(&config.token_path));
    let local_url = config.local_url();

    let mal = match &config.myanimelist {
        Some(mal_config) => {
            let store = Arc::new(CredentialStore::new(
                tokens.get(TrackerType::MyAnimeList),
                Box::new(tokens.sink(TrackerType::MyAnimeList)),
            ));
            Some(Arc::new(MyAnimeList::new(
                &local_url,
                mal_config.client_id.clone(),
                mal_config.client_secret.clone(),
                store,
            )?))
        }
        None => None,
    };

    let anilist = match &config.anilist {
        Some(anilist_config) => {
            let store = Arc::new(CredentialStore::new(
                tokens.get(TrackerType::AniList),
                Box::new(tokens.sink(TrackerType::AniList)),
            ));
            Some(Arc::new(AniList::new(
                &local_url,
                anilist_config.client_id.clone(),
                anilist_config.client_secret.clone(),
                store,
            )?))
        }
        None => None,
    };

    let registry = Arc::new(TrackerRegistry::new(mal, anilist));
    // Refresh expired persisted credentials before taking requests.
    registry.init().await;

    let tracker_service = Arc::new(TrackerService::new(
        TrackingClientImpl::new(&config.suwayomi_url),
        config.redirect_url.clone(),
    ));
    let library_service = Arc::new(LibraryService::new(LibraryRepositoryImpl::new(
        &config.suwayomi_url,
    )));

    let server = ServerBuilder::new()
        .with_registry(registry)
        .with_tracker_service(tracker_service)
        .with_library_service(library_service)
        .with_callback_settings(CallbackSettings {
            anilist_min_code_length: config.anilist_min_code_length,
            redirect_url: config.redirect_url.clone(),
        })
        .build()?;

    info!("hondana listening on port {}", config.port);
    server.serve(([0, 0, 0, 0], config.port)).await?;

    Ok(())
}
