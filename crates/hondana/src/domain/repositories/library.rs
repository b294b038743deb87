use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::library::{Category, Manga};

#[derive(Debug, Error)]
pub enum LibraryRepositoryError {
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),
    #[error("http error: {0}")]
    Http(#[from] anyhow::Error),
}

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, LibraryRepositoryError>;

    async fn category_manga(
        &self,
        category_id: i64,
    ) -> Result<Vec<Manga>, LibraryRepositoryError>;
}
