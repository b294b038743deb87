use anyhow::anyhow;
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::search::TrackerSearchResult;
use crate::domain::entities::tracker::{SuwayomiMangaStatistics, TrackerType};
use crate::domain::repositories::tracking::{TrackingClient, TrackingClientError};

#[derive(Debug, Error)]
pub enum TrackerServiceError {
    #[error("unknown tracker id {0}")]
    UnknownTracker(i64),
    #[error("client error: {0}")]
    Client(#[from] TrackingClientError),
    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// State payload round-tripped through the provider redirect so the callback
/// can tell which tracker it belongs to.
#[derive(Debug, Serialize)]
struct StateAuthParam<'a> {
    #[serde(rename = "redirectUrl")]
    redirect_url: &'a str,
    #[serde(rename = "trackerId")]
    tracker_id: i64,
    #[serde(rename = "anyOtherInfo")]
    any_other_info: &'a str,
}

/// Tracker-agnostic orchestration over the manga server's tracking surface.
/// Every operation resolves the numeric tracker id through the registry first
/// and rejects unknown ids.
pub struct TrackerService<C> {
    client: C,
    redirect_url: String,
}

impl<C> TrackerService<C>
where
    C: TrackingClient,
{
    pub fn new(client: C, redirect_url: String) -> Self {
        Self {
            client,
            redirect_url,
        }
    }

    pub async fn is_authenticated(&self, tracker_id: i64) -> Result<bool, TrackerServiceError> {
        let tracker = self.resolve(tracker_id)?;

        Ok(self.client.is_tracker_logged_in(tracker.id()).await?)
    }

    pub async fn auth_url(&self, tracker_id: i64) -> Result<String, TrackerServiceError> {
        let state = self.state_auth_param(tracker_id)?;
        let url = self.client.tracker_auth_url(tracker_id).await?;

        Ok(format!("{url}{state}"))
    }

    pub async fn search(
        &self,
        tracker_id: i64,
        query: &str,
    ) -> Result<Vec<TrackerSearchResult>, TrackerServiceError> {
        let tracker = self.resolve(tracker_id)?;

        Ok(self.client.search_tracker(query, tracker.id()).await?)
    }

    pub async fn track(
        &self,
        manga_id: i64,
        remote_id: i64,
        tracker_id: i64,
    ) -> Result<(), TrackerServiceError> {
        let tracker = self.resolve(tracker_id)?;

        Ok(self
            .client
            .track_manga(manga_id, remote_id, tracker.id())
            .await?)
    }

    pub async fn login_suwayomi(
        &self,
        callback_url: &str,
        tracker_id: i64,
    ) -> Result<(), TrackerServiceError> {
        let tracker = self.resolve(tracker_id)?;

        Ok(self
            .client
            .login_tracker(callback_url, tracker.id())
            .await?)
    }

    pub async fn statistics(
        &self,
        manga_id: i64,
    ) -> Result<Vec<SuwayomiMangaStatistics>, TrackerServiceError> {
        let records = self.client.track_records(manga_id).await?;

        Ok(records
            .iter()
            .map(SuwayomiMangaStatistics::from)
            .collect())
    }

    fn resolve(&self, tracker_id: i64) -> Result<TrackerType, TrackerServiceError> {
        TrackerType::from_id(tracker_id).ok_or(TrackerServiceError::UnknownTracker(tracker_id))
    }

    fn state_auth_param(&self, tracker_id: i64) -> Result<String, TrackerServiceError> {
        let tracker = self.resolve(tracker_id)?;

        let payload = StateAuthParam {
            redirect_url: &self.redirect_url,
            tracker_id: tracker.id(),
            any_other_info: tracker.name(),
        };
        let json = serde_json::to_string(&payload).map_err(|e| anyhow!("{e}"))?;

        Ok(format!("&state={}", urlencoding::encode(&json)))
    }
}
