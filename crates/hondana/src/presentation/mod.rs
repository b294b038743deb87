pub mod rest;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use self::rest::health::health_check;
use self::rest::library::library;
use self::rest::tracking::{
    manga_statistics, track_auth_url, track_bind, track_search, track_status, tracker_list,
    tracker_login,
};
use self::rest::validate::{
    CallbackSettings, validate_anilist, validate_myanimelist, validate_suwayomi,
};
use crate::domain::services::library::LibraryService;
use crate::domain::services::tracker::TrackerService;
use crate::infrastructure::repositories::library::LibraryRepositoryImpl;
use crate::infrastructure::repositories::tracking::TrackingClientImpl;
use crate::infrastructure::trackers::TrackerRegistry;

pub struct ServerBuilder {
    registry: Option<Arc<TrackerRegistry>>,
    tracker_service: Option<Arc<TrackerService<TrackingClientImpl>>>,
    library_service: Option<Arc<LibraryService<LibraryRepositoryImpl>>>,
    callback_settings: Option<CallbackSettings>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            tracker_service: None,
            library_service: None,
            callback_settings: None,
        }
    }

    pub fn with_registry(self, registry: Arc<TrackerRegistry>) -> Self {
        Self {
            registry: Some(registry),
            ..self
        }
    }

    pub fn with_tracker_service(
        self,
        tracker_service: Arc<TrackerService<TrackingClientImpl>>,
    ) -> Self {
        Self {
            tracker_service: Some(tracker_service),
            ..self
        }
    }

    pub fn with_library_service(
        self,
        library_service: Arc<LibraryService<LibraryRepositoryImpl>>,
    ) -> Self {
        Self {
            library_service: Some(library_service),
            ..self
        }
    }

    pub fn with_callback_settings(self, callback_settings: CallbackSettings) -> Self {
        Self {
            callback_settings: Some(callback_settings),
            ..self
        }
    }

    pub fn build(self) -> Result<Server, anyhow::Error> {
        let registry = self.registry.ok_or_else(|| anyhow!("no tracker registry"))?;
        let tracker_service = self
            .tracker_service
            .ok_or_else(|| anyhow!("no tracker service"))?;
        let library_service = self
            .library_service
            .ok_or_else(|| anyhow!("no library service"))?;
        let callback_settings = self
            .callback_settings
            .ok_or_else(|| anyhow!("no callback settings"))?;

        Ok(Server::new(
            registry,
            tracker_service,
            library_service,
            callback_settings,
        ))
    }
}

pub struct Server {
    router: Router,
}

impl Server {
    pub fn new(
        registry: Arc<TrackerRegistry>,
        tracker_service: Arc<TrackerService<TrackingClientImpl>>,
        library_service: Arc<LibraryService<LibraryRepositoryImpl>>,
        callback_settings: CallbackSettings,
    ) -> Self {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/validate/anilist", get(validate_anilist))
            .route("/validate/myanimelist", get(validate_myanimelist))
            .route("/validate/suwayomi", get(validate_suwayomi))
            .route("/api/library", get(library))
            .route("/api/track/{tracker_id}/login", get(track_auth_url))
            .route("/api/track/{tracker_id}/status", get(track_status))
            .route("/api/track/{tracker_id}/search", get(track_search))
            .route("/api/track/bind", post(track_bind))
            .route("/api/manga/{manga_id}/statistics", get(manga_statistics))
            .route("/api/tracker/{tracker_id}/login", get(tracker_login))
            .route("/api/tracker/{tracker_id}/list", get(tracker_list))
            .layer(Extension(registry))
            .layer(Extension(tracker_service))
            .layer(Extension(library_service))
            .layer(Extension(callback_settings))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );

        Self { router }
    }

    pub async fn serve<A: Into<SocketAddr>>(self, addr: A) -> Result<(), anyhow::Error> {
        axum_server::bind(addr.into())
            .serve(self.router.into_make_service())
            .await?;

        Ok(())
    }
}
