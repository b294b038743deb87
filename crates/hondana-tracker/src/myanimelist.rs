use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDate;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RefreshToken, TokenUrl, basic::BasicClient,
    reqwest::async_http_client,
};
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::{CredentialStore, Error, OAuthData, PkceCache, Session, Token, Tracker};

pub const NAME: &str = "myanimelist";

const AUTHORIZE_URL: &str = "https://myanimelist.net/v1/oauth2/authorize";
const TOKEN_URL: &str = "https://myanimelist.net/v1/oauth2/token";
const MANGA_LIST_URL: &str = "https://api.myanimelist.net/v2/users/@me/mangalist";

const PAGE_SIZE: i64 = 100;
const LIST_FIELDS: &str = "id,title,main_picture,synopsis,status,list_status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalListStatus {
    Reading,
    Completed,
    OnHold,
    Dropped,
    PlanToRead,
}

impl MalListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Dropped => "dropped",
            Self::PlanToRead => "plan_to_read",
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MyListStatus {
    pub status: Option<String>,
    pub score: i64,
    pub num_chapters_read: i64,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MainPicture {
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Manga {
    pub id: i64,
    pub title: String,
    pub synopsis: String,
    pub main_picture: MainPicture,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListEntry {
    pub node: Manga,
    #[serde(default)]
    pub list_status: Option<MyListStatus>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Paging {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetMangaListResponse {
    pub data: Vec<ListEntry>,
    #[serde(default)]
    pub paging: Paging,
}

pub struct MyAnimeList {
    oauth_client: BasicClient,
    api_client: reqwest::Client,
    pkce_cache: PkceCache,
    credentials: Arc<CredentialStore>,
}

#[async_trait]
impl Tracker for MyAnimeList {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_logged_in(&self) -> bool {
        self.credentials.is_authenticated()
    }

    fn get_authorize_url(&self) -> Result<Session, Error> {
        let (pkce_code_challenge, pkce_code_verifier) = PkceCodeChallenge::new_random_plain();

        let session_id = Uuid::new_v4();
        self.pkce_cache
            .insert(session_id, pkce_code_verifier.secret().to_owned());

        let (authorize_url, _csrf_state) = self
            .oauth_client
            .authorize_url(|| CsrfToken::new(session_id.to_string()))
            .set_pkce_challenge(pkce_code_challenge)
            .url();

        Ok(Session {
            authorize_url: authorize_url.to_string(),
            session_id: Some(session_id.to_string()),
        })
    }

    async fn exchange_code(
        &self,
        code: String,
        session_id: Option<String>,
    ) -> Result<OAuthData, Error> {
        // An unknown session and an expired one are indistinguishable here.
        let verifier = session_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
            .and_then(|id| self.pkce_cache.take(&id))
            .ok_or(Error::InvalidSession)?;

        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(verifier))
            .request_async(async_http_client)
            .await
            .map_err(|e| anyhow!("{e}"))?;

        let token_str = serde_json::to_string(&token).map_err(|e| anyhow!("{e}"))?;
        let token: Token = serde_json::from_str(&token_str).map_err(|e| anyhow!("{e}"))?;

        let data = OAuthData::from_token(token);
        self.credentials.swap(data.clone())?;

        Ok(data)
    }

    async fn refresh_token(&self, refresh_token: String) -> Result<OAuthData, Error> {
        let token = self
            .oauth_client
            .exchange_refresh_token(&RefreshToken::new(refresh_token))
            .request_async(async_http_client)
            .await
            .map_err(|e| anyhow!("{e}"))?;

        let token_str = serde_json::to_string(&token).map_err(|e| anyhow!("{e}"))?;
        let token: Token = serde_json::from_str(&token_str).map_err(|e| anyhow!("{e}"))?;

        let data = OAuthData::from_token(token);
        self.credentials.swap(data.clone())?;

        Ok(data)
    }

    async fn init(&self) {
        let Some(data) = self.credentials.current() else {
            return;
        };
        if !data.is_expired() {
            return;
        }

        info!("stored myanimelist token expired, refreshing");
        match self.refresh_token(data.refresh_token).await {
            Ok(_) => info!("refreshed myanimelist token"),
            Err(e) => {
                error!("failed to refresh myanimelist token: {e}");
                self.credentials.clear();
            }
        }
    }
}

impl MyAnimeList {
    pub fn new(
        base_url: &str,
        client_id: String,
        client_secret: String,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, Error> {
        let client_id = ClientId::new(client_id);
        let client_secret = ClientSecret::new(client_secret);
        let authorization_url =
            AuthUrl::new(AUTHORIZE_URL.to_string()).map_err(|e| anyhow!("{e}"))?;
        let token_url = TokenUrl::new(TOKEN_URL.to_string()).map_err(|e| anyhow!("{e}"))?;

        let redirect_url =
            RedirectUrl::new(format!("{base_url}/validate/{NAME}")).map_err(|e| anyhow!("{e}"))?;
        let client = BasicClient::new(
            client_id,
            Some(client_secret),
            authorization_url,
            Some(token_url),
        )
        .set_redirect_uri(redirect_url);

        Ok(Self {
            oauth_client: client,
            api_client: reqwest::Client::new(),
            pkce_cache: PkceCache::default(),
            credentials,
        })
    }

    /// Fetches every entry of the user's manga list with the given status,
    /// following the paging cursor until exhausted. The whole list is
    /// accumulated in memory; a single user's library stays small enough.
    pub async fn get_manga_with_status(
        &self,
        status: MalListStatus,
    ) -> Result<Vec<ListEntry>, Error> {
        let token = self.credentials.current().ok_or(Error::NotAuthenticated)?;

        let mut entries = vec![];
        let mut offset = 0;
        loop {
            let res = self
                .get_manga_list_page(&token.access_token, status, offset)
                .await?;

            let has_next = res.paging.next.is_some() && !res.data.is_empty();
            entries.extend(res.data);

            if !has_next {
                break;
            }
            offset += PAGE_SIZE;
        }

        debug!("got {} manga with status {}", entries.len(), status.as_str());

        Ok(entries)
    }

    async fn get_manga_list_page(
        &self,
        token: &str,
        status: MalListStatus,
        offset: i64,
    ) -> Result<GetMangaListResponse, Error> {
        let res = self
            .api_client
            .get(MANGA_LIST_URL)
            .bearer_auth(token)
            .query(&[
                ("status", status.as_str().to_string()),
                ("sort", "manga_title".to_string()),
                ("fields", LIST_FIELDS.to_string()),
                ("nsfw", "true".to_string()),
                ("limit", format!("{PAGE_SIZE}")),
                ("offset", format!("{offset}")),
            ])
            .send()
            .await
            .map_err(|e| Error::Other(anyhow!("{e}")))?
            .error_for_status()
            .map_err(|e| {
                if e.status() == Some(StatusCode::UNAUTHORIZED) {
                    Error::Unauthorized
                } else {
                    Error::Other(anyhow!("{e}"))
                }
            })?
            .json()
            .await
            .map_err(|e| anyhow!("{e}"))?;

        Ok(res)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::credential::DiscardCredentials;

    fn client() -> MyAnimeList {
        let store = Arc::new(CredentialStore::new(None, Box::new(DiscardCredentials)));
        MyAnimeList::new(
            "http://localhost:8080",
            "client-id".to_string(),
            "".to_string(),
            store,
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_embeds_session() {
        let mal = client();

        let session = mal.get_authorize_url().unwrap();
        let session_id = session.session_id.unwrap();

        assert!(session.authorize_url.starts_with(AUTHORIZE_URL));
        assert!(session.authorize_url.contains("response_type=code"));
        assert!(session.authorize_url.contains("client_id=client-id"));
        assert!(session.authorize_url.contains("code_challenge="));
        assert!(
            session
                .authorize_url
                .contains(&format!("state={session_id}"))
        );
    }

    #[tokio::test]
    async fn test_exchange_code_with_unknown_session_fails() {
        let mal = client();

        let result = mal
            .exchange_code("code".to_string(), Some(Uuid::new_v4().to_string()))
            .await;

        assert!(matches!(result, Err(Error::InvalidSession)));
    }

    #[tokio::test]
    async fn test_exchange_code_without_session_fails() {
        let mal = client();

        let result = mal.exchange_code("code".to_string(), None).await;

        assert!(matches!(result, Err(Error::InvalidSession)));
    }

    #[tokio::test]
    async fn test_exchange_consumes_session() {
        let mal = client();
        let session = mal.get_authorize_url().unwrap();
        let session_id = Uuid::parse_str(session.session_id.as_deref().unwrap()).unwrap();

        // The verifier is reserved for the exchange; a second attempt with the
        // same session must not find it.
        assert!(mal.pkce_cache.take(&session_id).is_some());
        let result = mal.exchange_code("code".to_string(), session.session_id).await;

        assert!(matches!(result, Err(Error::InvalidSession)));
    }

    #[tokio::test]
    async fn test_listing_requires_authentication() {
        let mal = client();

        let result = mal.get_manga_with_status(MalListStatus::Reading).await;

        assert!(matches!(result, Err(Error::NotAuthenticated)));
    }
}
