use std::sync::Arc;

use axum::Extension;
use axum::extract::{Query, RawQuery};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use hondana_tracker::{Error, Tracker, anilist, myanimelist};
use serde::Deserialize;

use crate::domain::entities::tracker::TrackerType;
use crate::domain::services::tracker::TrackerService;
use crate::infrastructure::repositories::tracking::TrackingClientImpl;
use crate::infrastructure::trackers::TrackerRegistry;

#[derive(Debug, Clone)]
pub struct CallbackSettings {
    pub anilist_min_code_length: usize,
    pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    #[serde(rename = "trackerId")]
    tracker_id: i64,
}

/// What happened on one callback hit. The user is redirected to the root path
/// no matter what; the outcome exists so failures stay observable in logs and
/// tests instead of vanishing into the redirect.
#[derive(Debug)]
pub enum CallbackOutcome {
    MissingCode,
    CodeTooShort,
    Exchanged,
    ExchangeFailed(Error),
}

/// Validates the incoming code and attempts the token exchange. Codes shorter
/// than `min_code_length` are rejected without contacting the provider.
pub async fn exchange_outcome(
    tracker: &dyn Tracker,
    code: &str,
    session_id: Option<String>,
    min_code_length: usize,
) -> CallbackOutcome {
    if code.is_empty() {
        return CallbackOutcome::MissingCode;
    }
    if code.len() < min_code_length {
        return CallbackOutcome::CodeTooShort;
    }

    match tracker.exchange_code(code.to_string(), session_id).await {
        Ok(_) => CallbackOutcome::Exchanged,
        Err(e) => CallbackOutcome::ExchangeFailed(e),
    }
}

fn log_outcome(tracker: &str, outcome: &CallbackOutcome) {
    match outcome {
        CallbackOutcome::MissingCode => info!("{tracker} authorization code is empty"),
        CallbackOutcome::CodeTooShort => info!("{tracker} authorization code is too short"),
        CallbackOutcome::Exchanged => info!("{tracker} login complete"),
        CallbackOutcome::ExchangeFailed(e) => {
            error!("error exchanging {tracker} authorization code: {e}")
        }
    }
}

fn redirect_to_root() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/")])
}

pub async fn validate_anilist(
    Extension(registry): Extension<Arc<TrackerRegistry>>,
    Extension(settings): Extension<CallbackSettings>,
    Query(params): Query<ValidateParams>,
) -> impl IntoResponse {
    info!("validating anilist authorization code");

    match registry.get(TrackerType::AniList) {
        Some(client) => {
            let outcome = exchange_outcome(
                client.as_ref(),
                &params.code,
                None,
                settings.anilist_min_code_length,
            )
            .await;
            log_outcome(anilist::NAME, &outcome);
        }
        None => warn!("anilist is not configured"),
    }

    redirect_to_root()
}

pub async fn validate_myanimelist(
    Extension(registry): Extension<Arc<TrackerRegistry>>,
    Query(params): Query<ValidateParams>,
) -> impl IntoResponse {
    info!("validating myanimelist authorization code");

    match registry.get(TrackerType::MyAnimeList) {
        Some(client) => {
            let outcome =
                exchange_outcome(client.as_ref(), &params.code, params.state.clone(), 0).await;
            log_outcome(myanimelist::NAME, &outcome);
        }
        None => warn!("myanimelist is not configured"),
    }

    redirect_to_root()
}

pub async fn validate_suwayomi(
    Extension(service): Extension<Arc<TrackerService<TrackingClientImpl>>>,
    Extension(settings): Extension<CallbackSettings>,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<ValidateParams>,
) -> impl IntoResponse {
    info!("forwarding tracker callback to the manga server");

    if params.code.is_empty() {
        info!("tracker callback without authorization code");
        return redirect_to_root();
    }

    let tracker_id = params
        .state
        .as_deref()
        .and_then(|state| serde_json::from_str::<StatePayload>(state).ok())
        .map(|payload| payload.tracker_id);

    match tracker_id {
        Some(tracker_id) => {
            // The manga server consumes the full callback URL itself.
            let callback_url = match &raw_query {
                Some(query) => format!("{}?{query}", settings.redirect_url),
                None => settings.redirect_url.clone(),
            };

            if let Err(e) = service.login_suwayomi(&callback_url, tracker_id).await {
                error!("error completing tracker login: {e}");
            }
        }
        None => warn!("tracker callback state is missing a tracker id"),
    }

    redirect_to_root()
}
