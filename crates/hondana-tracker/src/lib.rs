#[macro_use]
extern crate log;

pub mod credential;
pub use credential::{CredentialSink, CredentialStore, OAuthData};

pub mod pkce;
pub use pkce::PkceCache;

pub mod myanimelist;
pub use myanimelist::MyAnimeList;

pub mod anilist;
pub use anilist::AniList;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid or expired authorization session")]
    InvalidSession,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("unauthorized")]
    Unauthorized,
    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result of starting an authorization flow. `session_id` backreferences the
/// PKCE verifier cached for the exchange; trackers without PKCE leave it empty.
#[derive(Debug, Clone)]
pub struct Session {
    pub authorize_url: String,
    pub session_id: Option<String>,
}

/// Raw token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub token_type: String,
    pub expires_in: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_logged_in(&self) -> bool;

    fn get_authorize_url(&self) -> Result<Session, Error>;

    async fn exchange_code(
        &self,
        code: String,
        session_id: Option<String>,
    ) -> Result<OAuthData, Error>;

    async fn refresh_token(&self, refresh_token: String) -> Result<OAuthData, Error>;

    /// Refresh an expired persisted credential before the tracker is used. A
    /// failed refresh leaves the tracker unauthenticated until a fresh login.
    async fn init(&self);
}
