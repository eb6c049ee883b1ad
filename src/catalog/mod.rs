//! Article catalog: the approved articles, newest first.

use std::sync::Arc;

use mongodb::bson::doc;

use crate::errors::AppError;
use crate::models::ArticleView;
use crate::store::ArticleStore;

pub struct ArticleCatalog {
    store: Arc<dyn ArticleStore>,
}

impl ArticleCatalog {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Every approved article ordered by `created_at` descending.
    ///
    /// Either the whole list or [`AppError::StoreUnavailable`]; never a partial list.
    pub async fn list_approved(&self) -> Result<Vec<ArticleView>, AppError> {
        let documents = self
            .store
            .find_sorted(doc! { "approved": true }, doc! { "created_at": -1 })
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Database error: {}", e)))?;

        tracing::debug!(count = documents.len(), "listed approved articles");

        Ok(documents.iter().map(ArticleView::from_document).collect())
    }
}
