//! Article API endpoints.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::ArticleView;
use crate::AppState;

/// GET /api/articles - List approved articles, newest first.
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleView>>, AppError> {
    match state.catalog.list_approved().await {
        Ok(articles) => Ok(Json(articles)),
        Err(e) => {
            tracing::error!(route = "articles", error = %e, "Failed to list articles");
            Err(e)
        }
    }
}
