//! Article operations: listing, lookup by slug, archives, related content.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::warn;

use foglio_api_types::{Article, Comment, Document, DocumentList};

use crate::client::ContentClient;
use crate::error::ClientError;
use crate::query::{Pagination, Populate, Query, Relation};

const SOURCE: &str = "services::articles";
const CONTENT_TYPE: &str = "articles";
const COMMENTS_CONTENT_TYPE: &str = "comments";

const DEFAULT_PAGE_SIZE: u32 = 10;
const ARCHIVE_PAGE_SIZE: u32 = 100;
const TRENDING_WINDOW_DAYS: i64 = 7;

/// Optional overrides for [`Articles::list`].
#[derive(Debug, Clone, Default)]
pub struct ArticleListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: Option<Value>,
    pub sort: Option<Vec<String>>,
}

/// Input for [`Articles::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    /// Parent comment for threaded replies.
    pub parent_comment_id: Option<i64>,
}

/// One year-month bucket of the publication archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthArchive {
    /// `YYYY-MM` key, e.g. `2026-08`.
    pub month: String,
    pub year: i32,
    pub month_num: u8,
    pub count: u64,
}

pub struct Articles {
    client: ContentClient,
}

impl Articles {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    /// Default population graph for article reads: author with avatar,
    /// category, cover, and SEO component.
    fn default_populate() -> Populate {
        Populate::nested([
            ("author", Relation::all().populate(Populate::fields(["avatar"]))),
            ("category", Relation::all()),
            ("cover", Relation::all()),
            ("seo", Relation::all()),
        ])
    }

    fn published_filter() -> Value {
        json!({ "status": { "$eq": "published" } })
    }

    /// Paginated article listing with the default population graph.
    pub async fn list(
        &self,
        params: ArticleListParams,
    ) -> Result<DocumentList<Article>, ClientError> {
        let mut query = Query::new()
            .populate(Self::default_populate())
            .pagination(Pagination::page(
                params.page.unwrap_or(1),
                params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ));

        query.sort = params
            .sort
            .unwrap_or_else(|| vec!["publishedAt:desc".to_string()]);
        query.filters = params.filters;

        self.client.find(CONTENT_TYPE, &query).await
    }

    /// Featured articles for the homepage: reduced projection, bounded by
    /// `limit`, most recent first.
    pub async fn featured(&self, limit: u32) -> Result<DocumentList<Article>, ClientError> {
        let query = Query::new()
            .filters(json!({ "featured": { "$eq": true } }))
            .fields(["title", "description", "slug", "publishedAt"])
            .populate(Populate::nested([
                ("author", Relation::with_fields(["name"])),
                ("category", Relation::with_fields(["name"])),
                (
                    "cover",
                    Relation::with_fields(["url", "alternativeText", "width", "height"]),
                ),
            ]))
            .sort("publishedAt:desc")
            .pagination(Pagination::page(1, limit));

        self.client.find(CONTENT_TYPE, &query).await
    }

    /// Resolve one published article by exact slug with its full population
    /// graph. Returns `Ok(None)` when nothing matches.
    ///
    /// A hit spawns a detached view-count increment; its failure is logged
    /// and never surfaces to the reader.
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Article>, ClientError> {
        let query = Query::new()
            .filters(json!({
                "slug": { "$eq": slug },
                "status": { "$eq": "published" }
            }))
            .populate(Self::default_populate());

        let mut response: DocumentList<Article> = self.client.find(CONTENT_TYPE, &query).await?;
        if response.data.is_empty() {
            return Ok(None);
        }
        let article = response.data.remove(0);

        self.spawn_view_increment(&article);
        Ok(Some(article))
    }

    fn spawn_view_increment(&self, article: &Article) {
        if article.document_id.is_empty() {
            return;
        }
        let client = self.client.clone();
        let document_id = article.document_id.clone();
        let next_count = article.view_count.unwrap_or(0) + 1;

        tokio::spawn(async move {
            let result = client
                .update::<Article>(
                    CONTENT_TYPE,
                    &document_id,
                    json!({ "viewCount": next_count }),
                )
                .await;
            if let Err(err) = result {
                warn!(
                    target_module = SOURCE,
                    document_id = %document_id,
                    error = %err,
                    "view count increment failed"
                );
            }
        });
    }

    /// Publication archive: every published article grouped by year-month,
    /// most recent month first. Fetches `publishedAt` only, page by page;
    /// the page/pageSize mode guarantees disjoint pages, so no entity is
    /// counted twice.
    pub async fn archives(&self) -> Result<Vec<MonthArchive>, ClientError> {
        let mut buckets: BTreeMap<(i32, u8), u64> = BTreeMap::new();
        let mut page = 1u32;

        loop {
            let query = Query::new()
                .filters(Self::published_filter())
                .fields(["publishedAt"])
                .sort("publishedAt:desc")
                .pagination(Pagination::page(page, ARCHIVE_PAGE_SIZE));

            let response: DocumentList<Article> = self.client.find(CONTENT_TYPE, &query).await?;
            for article in &response.data {
                if let Some(published) = article.published_at {
                    let key = (published.year(), u8::from(published.month()));
                    *buckets.entry(key).or_insert(0) += 1;
                }
            }

            let page_count = response
                .meta
                .pagination
                .map(|meta| meta.page_count)
                .unwrap_or(page);
            if page >= page_count {
                break;
            }
            page += 1;
        }

        Ok(buckets
            .into_iter()
            .rev()
            .map(|((year, month_num), count)| MonthArchive {
                month: format!("{year:04}-{month_num:02}"),
                year,
                month_num,
                count,
            })
            .collect())
    }

    /// Articles sharing a category or tag with the given one, excluding it,
    /// most recent first.
    pub async fn related(
        &self,
        document_id: &str,
        limit: u32,
    ) -> Result<DocumentList<Article>, ClientError> {
        let source_query = Query::new().populate(Populate::fields(["category", "tags"]));
        let source = self
            .client
            .find_one::<Article>(CONTENT_TYPE, document_id, &source_query)
            .await?;

        let Some(article) = source.data else {
            return Ok(DocumentList::empty());
        };

        let category_ids: Vec<i64> = article.category.iter().map(|c| c.id).collect();
        let tag_ids: Vec<i64> = article
            .tags
            .iter()
            .flatten()
            .map(|tag| tag.id)
            .collect();

        let query = Query::new()
            .filters(json!({
                "$and": [
                    { "id": { "$ne": article.id } },
                    { "status": { "$eq": "published" } },
                    { "$or": [
                        { "category": { "id": { "$in": category_ids } } },
                        { "tags": { "id": { "$in": tag_ids } } }
                    ] }
                ]
            }))
            .populate(Populate::fields(["author", "cover", "category"]))
            .sort("publishedAt:desc")
            .pagination(Pagination::page(1, limit));

        self.client.find(CONTENT_TYPE, &query).await
    }

    /// Full-text-ish search over title, description, and content.
    pub async fn search(
        &self,
        term: &str,
        params: ArticleListParams,
    ) -> Result<DocumentList<Article>, ClientError> {
        let filters = json!({
            "$or": [
                { "title": { "$contains": term } },
                { "description": { "$contains": term } },
                { "content": { "$contains": term } }
            ]
        });
        self.list(ArticleListParams {
            filters: Some(filters),
            ..params
        })
        .await
    }

    /// Most-viewed published articles of the last week.
    pub async fn trending(&self, limit: u32) -> Result<DocumentList<Article>, ClientError> {
        let since = time::OffsetDateTime::now_utc() - time::Duration::days(TRENDING_WINDOW_DAYS);
        let since = since
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        let query = Query::new()
            .filters(json!({
                "status": { "$eq": "published" },
                "publishedAt": { "$gte": since }
            }))
            .populate(Populate::fields(["author", "cover"]))
            .sort("viewCount:desc")
            .sort("publishedAt:desc")
            .pagination(Pagination::page(1, limit));

        self.client.find(CONTENT_TYPE, &query).await
    }

    /// Articles in the category with the given slug.
    pub async fn by_category(
        &self,
        category_slug: &str,
        params: ArticleListParams,
    ) -> Result<DocumentList<Article>, ClientError> {
        let filters = json!({
            "category": { "slug": { "$eq": category_slug } }
        });
        self.list(ArticleListParams {
            filters: Some(filters),
            ..params
        })
        .await
    }

    /// Articles written by the author with the given slug.
    pub async fn by_author(
        &self,
        author_slug: &str,
        params: ArticleListParams,
    ) -> Result<DocumentList<Article>, ClientError> {
        let filters = json!({
            "author": { "slug": { "$eq": author_slug } }
        });
        self.list(ArticleListParams {
            filters: Some(filters),
            ..params
        })
        .await
    }

    /// Articles carrying the tag with the given slug.
    pub async fn by_tag(
        &self,
        tag_slug: &str,
        params: ArticleListParams,
    ) -> Result<DocumentList<Article>, ClientError> {
        let filters = json!({
            "tags": { "slug": { "$in": [tag_slug] } }
        });
        self.list(ArticleListParams {
            filters: Some(filters),
            ..params
        })
        .await
    }

    /// Submit a reader comment on an article. Comments are created
    /// unapproved and wait for moderation on the CMS side.
    pub async fn create_comment(
        &self,
        article_id: i64,
        comment: NewComment,
    ) -> Result<Document<Comment>, ClientError> {
        let published_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        let mut attributes = json!({
            "content": comment.content,
            "authorName": comment.author_name,
            "authorEmail": comment.author_email,
            "article": article_id,
            "approved": false,
            "publishedAt": published_at,
        });
        if let Some(parent) = comment.parent_comment_id {
            attributes["parentCommentId"] = json!(parent);
        }

        self.client.create(COMMENTS_CONTENT_TYPE, attributes).await
    }
}
