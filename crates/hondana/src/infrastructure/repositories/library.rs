use anyhow::anyhow;
use async_trait::async_trait;

use crate::domain::entities::library::{Category, Manga};
use crate::domain::repositories::library::{LibraryRepository, LibraryRepositoryError};

pub struct LibraryRepositoryImpl {
    base_url: String,
    client: reqwest::Client,
}

impl LibraryRepositoryImpl {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LibraryRepository for LibraryRepositoryImpl {
    async fn categories(&self) -> Result<Vec<Category>, LibraryRepositoryError> {
        let res = self
            .client
            .get(format!("{}/api/v1/category", self.base_url))
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| LibraryRepositoryError::InvalidResponse(format!("{e}")))?;

        Ok(res)
    }

    async fn category_manga(
        &self,
        category_id: i64,
    ) -> Result<Vec<Manga>, LibraryRepositoryError> {
        let res = self
            .client
            .get(format!("{}/api/v1/category/{category_id}", self.base_url))
            .send()
            .await
            .map_err(|e| anyhow!("{e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("{e}"))?
            .json()
            .await
            .map_err(|e| LibraryRepositoryError::InvalidResponse(format!("{e}")))?;

        Ok(res)
    }
}
