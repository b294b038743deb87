use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;

use crate::domain::entities::library::Manga;
use crate::domain::services::library::LibraryService;
use crate::infrastructure::repositories::library::LibraryRepositoryImpl;

pub async fn library(
    Extension(service): Extension<Arc<LibraryService<LibraryRepositoryImpl>>>,
) -> Result<Json<Vec<Manga>>, (StatusCode, String)> {
    let manga = service
        .library()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(manga))
}
