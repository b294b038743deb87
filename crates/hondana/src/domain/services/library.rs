use crate::domain::entities::library::Manga;
use crate::domain::repositories::library::{LibraryRepository, LibraryRepositoryError};

/// Read-only view over the manga server's library.
pub struct LibraryService<R> {
    repo: R,
}

impl<R> LibraryService<R>
where
    R: LibraryRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The whole library, category by category. A category whose listing
    /// fails is skipped so the rest of the library still renders.
    pub async fn library(&self) -> Result<Vec<Manga>, LibraryRepositoryError> {
        let categories = self.repo.categories().await?;

        let mut manga = vec![];
        for category in categories {
            match self.repo.category_manga(category.id).await {
                Ok(list) => manga.extend(list),
                Err(e) => {
                    warn!("failed to load manga for category {}: {e}", category.id);
                }
            }
        }

        Ok(manga)
    }
}
