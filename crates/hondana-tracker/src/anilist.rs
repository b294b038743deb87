use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDate;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    TokenUrl, basic::BasicClient, reqwest::async_http_client,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::{CredentialStore, Error, OAuthData, Session, Token, Tracker};

pub const NAME: &str = "anilist";

const AUTHORIZE_URL: &str = "https://anilist.co/api/v2/oauth/authorize";
const TOKEN_URL: &str = "https://anilist.co/api/v2/oauth/token";
const GRAPHQL_URL: &str = "https://graphql.anilist.co/";

const PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl MediaListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Repeating => "REPEATING",
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
}

/// AniList fuzzy date; any missing component means the date is absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    pub title: Option<MediaTitle>,
    pub description: Option<String>,
    pub cover_image: Option<CoverImage>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaListItem {
    pub status: Option<MediaListStatus>,
    pub progress: Option<i64>,
    pub score: Option<f64>,
    pub started_at: Option<FuzzyDate>,
    pub completed_at: Option<FuzzyDate>,
    pub media: Media,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PageInfo {
    has_next_page: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MediaListPage {
    page_info: PageInfo,
    media_list: Vec<MediaListItem>,
}

pub struct AniList {
    oauth_client: BasicClient,
    api_client: reqwest::Client,
    credentials: Arc<CredentialStore>,
}

#[async_trait]
impl Tracker for AniList {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_logged_in(&self) -> bool {
        self.credentials.is_authenticated()
    }

    // AniList does not require PKCE, so there is no session to backreference.
    fn get_authorize_url(&self) -> Result<Session, Error> {
        let (authorize_url, _csrf_state) =
            self.oauth_client.authorize_url(CsrfToken::new_random).url();

        Ok(Session {
            authorize_url: authorize_url.to_string(),
            session_id: None,
        })
    }

    async fn exchange_code(
        &self,
        code: String,
        _session_id: Option<String>,
    ) -> Result<OAuthData, Error> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code))
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

        info!("stored anilist token expired, refreshing");
        match self.refresh_token(data.refresh_token).await {
            Ok(_) => info!("refreshed anilist token"),
            Err(e) => {
                error!("failed to refresh anilist token: {e}");
                self.credentials.clear();
            }
        }
    }
}

impl AniList {
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
            credentials,
        })
    }

    /// Fetches every list entry with the given status, page by page, until the
    /// listing reports no further pages.
    pub async fn get_manga_with_status(
        &self,
        status: MediaListStatus,
    ) -> Result<Vec<MediaListItem>, Error> {
        let token = self.credentials.current().ok_or(Error::NotAuthenticated)?;

        let user_id = self.get_viewer_id(&token.access_token).await?;

        const QUERY: &str = "
        query MangaList($userId: Int!, $status: MediaListStatus!, $page: Int!, $perPage: Int!) {
            Page(page: $page, perPage: $perPage) {
              pageInfo {
                hasNextPage
              }
              mediaList(userId: $userId, type: MANGA, status: $status) {
                status
                progress
                score(format: POINT_10)
                startedAt {
                  year
                  month
                  day
                }
                completedAt {
                  year
                  month
                  day
                }
                media {
                  id
                  title {
                    romaji
                  }
                  description(asHtml: false)
                  coverImage {
                    large
                    medium
                  }
                  status
                }
              }
            }
          }
        ";

        let mut entries = vec![];
        let mut page = 1;
        loop {
            let res = self
                .post_graphql(
                    &token.access_token,
                    &json!({
                        "query": QUERY,
                        "variables": {
                            "userId": user_id,
                            "status": status.as_str(),
                            "page": page,
                            "perPage": PAGE_SIZE,
                        }
                    }),
                )
                .await?;

            let res = res
                .get("data")
                .and_then(|data| data.get("Page"))
                .map(|page| page.to_owned())
                .ok_or_else(|| anyhow!("no data"))?;

            let list_page: MediaListPage =
                serde_json::from_value(res).map_err(|e| anyhow!("{e}"))?;

            let has_next = list_page.page_info.has_next_page;
            entries.extend(list_page.media_list);

            if !has_next {
                break;
            }
            page += 1;
        }

        debug!("got {} manga with status {}", entries.len(), status.as_str());

        Ok(entries)
    }

    async fn get_viewer_id(&self, token: &str) -> Result<i64, Error> {
        const QUERY: &str = "
        query {
            Viewer {
              id
            }
          }
        ";

        let res = self.post_graphql(token, &json!({ "query": QUERY })).await?;

        res.get("data")
            .and_then(|data| data.get("Viewer"))
            .and_then(|viewer| viewer.get("id"))
            .and_then(|id| id.as_i64())
            .ok_or_else(|| Error::Other(anyhow!("no viewer id")))
    }

    async fn post_graphql(
        &self,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let res = self
            .api_client
            .post(GRAPHQL_URL)
            .bearer_auth(token)
            .json(body)
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
            .json::<serde_json::Value>()
            .await
            .map_err(|e| anyhow!("{e}"))?;

        debug!("res: {res:?}");

        Ok(res)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::credential::DiscardCredentials;

    fn client() -> AniList {
        let store = Arc::new(CredentialStore::new(None, Box::new(DiscardCredentials)));
        AniList::new(
            "http://localhost:8080",
            "client-id".to_string(),
            "client-secret".to_string(),
            store,
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_has_no_session() {
        let anilist = client();

        let session = anilist.get_authorize_url().unwrap();

        assert!(session.authorize_url.starts_with(AUTHORIZE_URL));
        assert!(session.authorize_url.contains("response_type=code"));
        assert!(session.authorize_url.contains("client_id=client-id"));
        assert!(session.session_id.is_none());
    }

    #[tokio::test]
    async fn test_listing_requires_authentication() {
        let anilist = client();

        let result = anilist.get_manga_with_status(MediaListStatus::Current).await;

        assert!(matches!(result, Err(Error::NotAuthenticated)));
    }

    #[test]
    fn test_fuzzy_date_missing_component_is_absent() {
        let date = FuzzyDate {
            year: Some(2021),
            month: None,
            day: Some(3),
        };
        assert_eq!(date.to_date(), None);

        let date = FuzzyDate {
            year: Some(2021),
            month: Some(4),
            day: Some(3),
        };
        assert_eq!(date.to_date(), NaiveDate::from_ymd_opt(2021, 4, 3));
    }
}
