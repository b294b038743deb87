use std::sync::Arc;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entities::search::TrackerSearchResult;
use crate::domain::entities::tracker::{
    AniListMangaStatistics, MalMangaStatistics, MangaStatistics, TrackStatus, TrackerType,
};
use crate::domain::services::tracker::{TrackerService, TrackerServiceError};
use crate::infrastructure::repositories::tracking::TrackingClientImpl;
use crate::infrastructure::trackers::TrackerRegistry;

type RestError = (StatusCode, String);

fn service_error(e: TrackerServiceError) -> RestError {
    match e {
        TrackerServiceError::UnknownTracker(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn tracker_error(e: hondana_tracker::Error) -> RestError {
    match e {
        hondana_tracker::Error::NotAuthenticated => (StatusCode::UNAUTHORIZED, e.to_string()),
        e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn unknown_tracker(tracker_id: i64) -> RestError {
    (
        StatusCode::BAD_REQUEST,
        format!("unknown tracker id {tracker_id}"),
    )
}

fn not_configured() -> RestError {
    (StatusCode::NOT_FOUND, "tracker not configured".to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_logged_in: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authorize_url: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindParams {
    pub manga_id: i64,
    pub remote_id: i64,
    pub tracker_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: String,
}

/// One row of a tracker listing, flattened through the common statistics view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntry {
    pub title: String,
    pub status: Option<TrackStatus>,
    pub progress: f64,
    pub score: f64,
    pub started_at: Option<NaiveDate>,
    pub completed_at: Option<NaiveDate>,
}

impl TrackedEntry {
    fn new<S: MangaStatistics>(title: String, stats: Option<S>) -> Self {
        match stats {
            Some(stats) => Self {
                title,
                status: stats.status(),
                progress: stats.progress(),
                score: stats.score(),
                started_at: stats.started_at(),
                completed_at: stats.completed_at(),
            },
            None => Self {
                title,
                status: None,
                progress: 0.0,
                score: 0.0,
                started_at: None,
                completed_at: None,
            },
        }
    }
}

/// Auth URL for the manga-server-mediated login flow, state parameter
/// included.
pub async fn track_auth_url(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Path(tracker_id): Path<i64>,
) -> Result<Json<AuthUrlResponse>, RestError> {
    let auth_url = service.auth_url(tracker_id).await.map_err(service_error)?;

    Ok(Json(AuthUrlResponse { auth_url }))
}

pub async fn track_status(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Path(tracker_id): Path<i64>,
) -> Result<Json<StatusResponse>, RestError> {
    let is_logged_in = service
        .is_authenticated(tracker_id)
        .await
        .map_err(service_error)?;

    Ok(Json(StatusResponse { is_logged_in }))
}

pub async fn track_search(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Path(tracker_id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TrackerSearchResult>>, RestError> {
    let results = service
        .search(tracker_id, &params.query)
        .await
        .map_err(service_error)?;

    Ok(Json(results))
}

pub async fn track_bind(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Json(params): Json<BindParams>,
) -> Result<Json<()>, RestError> {
    service
        .track(params.manga_id, params.remote_id, params.tracker_id)
        .await
        .map_err(service_error)?;

    Ok(Json(()))
}

pub async fn manga_statistics(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Path(manga_id): Path<i64>,
) -> Result<Json<Vec<TrackedEntry>>, RestError> {
    let statistics = service.statistics(manga_id).await.map_err(service_error)?;

    let entries = statistics
        .into_iter()
        .map(|stats| TrackedEntry::new(String::new(), Some(stats)))
        .collect();

    Ok(Json(entries))
}

/// Auth URL for the direct OAuth flow against the tracker itself.
pub async fn tracker_login(
    Extension(registry): Extension<Arc<TrackerRegistry>>,
    Path(tracker_id): Path<i64>,
) -> Result<Json<SessionResponse>, RestError> {
    let tracker = TrackerType::from_id(tracker_id).ok_or_else(|| unknown_tracker(tracker_id))?;
    let client = registry.get(tracker).ok_or_else(not_configured)?;

    let session = client.get_authorize_url().map_err(tracker_error)?;

    Ok(Json(SessionResponse {
        authorize_url: session.authorize_url,
        session_id: session.session_id,
    }))
}

/// The user's tracker-side manga list with the given status, normalized
/// through the common statistics view.
pub async fn tracker_list(
    Extension(registry): Extension<Arc<TrackerRegistry>>,
    Path(tracker_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TrackedEntry>>, RestError> {
    let tracker = TrackerType::from_id(tracker_id).ok_or_else(|| unknown_tracker(tracker_id))?;
    let status = TrackStatus::parse(&params.status).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("unknown status {}", params.status),
        )
    })?;

    let entries = match tracker {
        TrackerType::MyAnimeList => {
            let mal = registry.myanimelist().ok_or_else(not_configured)?;
            mal.get_manga_with_status(status.to_mal())
                .await
                .map_err(tracker_error)?
                .into_iter()
                .map(|entry| {
                    let stats = entry.list_status.as_ref().map(MalMangaStatistics::from);
                    TrackedEntry::new(entry.node.title, stats)
                })
                .collect()
        }
        TrackerType::AniList => {
            let anilist = registry.anilist().ok_or_else(not_configured)?;
            anilist
                .get_manga_with_status(status.to_anilist())
                .await
                .map_err(tracker_error)?
                .into_iter()
                .map(|entry| {
                    let stats = AniListMangaStatistics::from(&entry);
                    let title = entry
                        .media
                        .title
                        .and_then(|title| title.romaji)
                        .unwrap_or_default();
                    TrackedEntry::new(title, Some(stats))
                })
                .collect()
        }
    };

    Ok(Json(entries))
}

#[cfg(test)]
mod test {
    use hondana_tracker::myanimelist::MyListStatus;

    use super::*;

    #[test]
    fn test_entry_without_statistics_is_empty() {
        let entry = TrackedEntry::new::<MalMangaStatistics>("Title".to_string(), None);

        assert_eq!(entry.title, "Title");
        assert_eq!(entry.status, None);
        assert_eq!(entry.progress, 0.0);
        assert_eq!(entry.started_at, None);
    }

    #[test]
    fn test_entry_flattens_statistics() {
        let status = MyListStatus {
            status: Some("completed".to_string()),
            score: 9,
            num_chapters_read: 120,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 2),
            finish_date: NaiveDate::from_ymd_opt(2021, 3, 4),
        };

        let entry = TrackedEntry::new(
            "Title".to_string(),
            Some(MalMangaStatistics::from(&status)),
        );

        assert_eq!(entry.status, Some(TrackStatus::Completed));
        assert_eq!(entry.progress, 120.0);
        assert_eq!(entry.score, 9.0);
        assert_eq!(entry.completed_at, NaiveDate::from_ymd_opt(2021, 3, 4));
    }

    #[test]
    fn test_error_mapping() {
        let (status, _) = service_error(TrackerServiceError::UnknownTracker(99));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = tracker_error(hondana_tracker::Error::NotAuthenticated);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
