//! Category operations: small find wrappers over the request engine.

use serde_json::json;

use foglio_api_types::{Category, DocumentList};

use crate::client::ContentClient;
use crate::error::ClientError;
use crate::query::{Pagination, Populate, Query, Relation};

const CONTENT_TYPE: &str = "categories";

const ALL_CATEGORIES_LIMIT: u32 = 100;

pub struct Categories {
    client: ContentClient,
}

impl Categories {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    /// Every category, name-sorted, with its image populated.
    pub async fn all(&self) -> Result<DocumentList<Category>, ClientError> {
        let query = Query::new()
            .sort("name:asc")
            .pagination(Pagination::page(1, ALL_CATEGORIES_LIMIT))
            .populate(Populate::nested([("image", Relation::all())]));

        self.client.find(CONTENT_TYPE, &query).await
    }

    /// Resolve one category by exact slug. Returns `Ok(None)` on no match.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Category>, ClientError> {
        let query = Query::new()
            .filters(json!({ "slug": { "$eq": slug } }))
            .populate(Populate::nested([("image", Relation::all())]));

        let mut response: DocumentList<Category> = self.client.find(CONTENT_TYPE, &query).await?;
        if response.data.is_empty() {
            return Ok(None);
        }
        Ok(Some(response.data.remove(0)))
    }

    /// Categories with their articles populated down to `id` only, so the
    /// caller can derive per-category article counts in one request.
    pub async fn with_article_counts(&self) -> Result<DocumentList<Category>, ClientError> {
        let query = Query::new()
            .sort("name:asc")
            .populate(Populate::nested([
                ("articles", Relation::with_fields(["id"])),
                ("image", Relation::all()),
            ]));

        self.client.find(CONTENT_TYPE, &query).await
    }
}
