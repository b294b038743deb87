use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::search::TrackerSearchResult;
use crate::domain::entities::tracker::TrackRecord;

#[derive(Debug, Error)]
pub enum TrackingClientError {
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),
    #[error("http error: {0}")]
    Http(#[from] anyhow::Error),
}

/// Tracking surface of the manga server. The server owns the tracker
/// credentials for the mediated flow; this client only forwards requests.
#[async_trait]
pub trait TrackingClient: Send + Sync {
    async fn is_tracker_logged_in(&self, tracker_id: i64) -> Result<bool, TrackingClientError>;

    async fn tracker_auth_url(&self, tracker_id: i64) -> Result<String, TrackingClientError>;

    async fn search_tracker(
        &self,
        query: &str,
        tracker_id: i64,
    ) -> Result<Vec<TrackerSearchResult>, TrackingClientError>;

    async fn track_manga(
        &self,
        manga_id: i64,
        remote_id: i64,
        tracker_id: i64,
    ) -> Result<(), TrackingClientError>;

    async fn login_tracker(
        &self,
        callback_url: &str,
        tracker_id: i64,
    ) -> Result<(), TrackingClientError>;

    async fn track_records(&self, manga_id: i64) -> Result<Vec<TrackRecord>, TrackingClientError>;
}
