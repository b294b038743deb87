use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::search::TrackerSearchResult;
use crate::domain::entities::tracker::TrackRecord;
use crate::domain::repositories::tracking::{TrackingClient, TrackingClientError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoggedInResponse {
    is_logged_in: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthUrlResponse {
    auth_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindRequest {
    manga_id: i64,
    remote_id: i64,
    tracker_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    url: &'a str,
    tracker_id: i64,
}

pub struct TrackingClientImpl {
    base_url: String,
    client: reqwest::Client,
}

impl TrackingClientImpl {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/track{path}", self.base_url)
    }
}

#[async_trait]
impl TrackingClient for TrackingClientImpl {
    async fn is_tracker_logged_in(&self, tracker_id: i64) -> Result<bool, TrackingClientError> {
        let res: LoggedInResponse = self
            .client
            .get(self.endpoint(&format!("/{tracker_id}/logged-in")))
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| TrackingClientError::InvalidResponse(format!("{e}")))?;

        Ok(res.is_logged_in)
    }

    async fn tracker_auth_url(&self, tracker_id: i64) -> Result<String, TrackingClientError> {
        let res: AuthUrlResponse = self
            .client
            .get(self.endpoint(&format!("/{tracker_id}/login-url")))
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| TrackingClientError::InvalidResponse(format!("{e}")))?;

        Ok(res.auth_url)
    }

    async fn search_tracker(
        &self,
        query: &str,
        tracker_id: i64,
    ) -> Result<Vec<TrackerSearchResult>, TrackingClientError> {
        let res = self
            .client
            .get(self.endpoint("/search"))
            .query(&[
                ("query", query.to_string()),
                ("trackerId", format!("{tracker_id}")),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| TrackingClientError::InvalidResponse(format!("{e}")))?;

        Ok(res)
    }

    async fn track_manga(
        &self,
        manga_id: i64,
        remote_id: i64,
        tracker_id: i64,
    ) -> Result<(), TrackingClientError> {
        self.client
            .post(self.endpoint("/bind"))
            .json(&BindRequest {
                manga_id,
                remote_id,
                tracker_id,
            })
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?;

        Ok(())
    }

    async fn login_tracker(
        &self,
        callback_url: &str,
        tracker_id: i64,
    ) -> Result<(), TrackingClientError> {
        self.client
            .post(self.endpoint("/login"))
            .json(&LoginRequest {
                url: callback_url,
                tracker_id,
            })
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?;

        Ok(())
    }

    async fn track_records(&self, manga_id: i64) -> Result<Vec<TrackRecord>, TrackingClientError> {
        let res = self
            .client
            .get(self.endpoint(&format!("/{manga_id}/records")))
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| TrackingClientError::InvalidResponse(format!("{e}")))?;

        Ok(res)
    }
}
