//! HTTP request engine for the content API.
//!
//! Composes the response cache, the rate accountant, and the network call:
//! cache lookup first (GET only), then quota accounting, then the
//! authenticated HTTPS request. Successful GET payloads are stored back into
//! the cache. The client is constructed once from [`Settings`] and cloned
//! cheaply; clones share one cache and one quota counter.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use foglio_api_types::{Document, DocumentList};

use crate::cache::ResponseCache;
use crate::config::Settings;
use crate::error::ClientError;
use crate::query::Query;
use crate::rate::RateAccountant;
use crate::services::{Articles, Categories};

const SOURCE: &str = "client";

struct ClientInner {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
    cache: ResponseCache,
    rate: RateAccountant,
}

/// Typed client for the remote content API.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ClientInner>,
}

impl ContentClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.http.timeout)
            .build()?;
        let base = settings.api.base_url.join("/")?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base,
                token: settings.api.token.clone(),
                cache: ResponseCache::new((&settings.cache).into()),
                rate: RateAccountant::new(settings.rate_limit.monthly_limit.get()),
            }),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("foglio/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.inner.base.join(path).map_err(ClientError::Url)
    }

    fn cache_key(path: &str, query: Option<&Query>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{path}?{}", q.encode()),
            _ => path.to_string(),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ClientError> {
        self.inner.rate.record()?;

        let mut url = self.url(path)?;
        if let Some(q) = query {
            if !q.is_empty() {
                url.set_query(Some(&q.encode()));
            }
        }

        let mut req = self.inner.http.request(method, url);
        if let Some(token) = &self.inner.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        req.send().await.map_err(ClientError::from_transport)
    }

    /// Issue one API request, applying cache-then-quota-then-network ordering.
    ///
    /// Only GET responses are cached; writes always reach the network.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.execute(method, path, query, body, true).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<Value>,
        use_cache: bool,
    ) -> Result<Value, ClientError> {
        let cacheable = use_cache && method == Method::GET;
        let key = Self::cache_key(path, query);

        if cacheable {
            if let Some(hit) = self.inner.cache.get(&key) {
                debug!(target_module = SOURCE, key = %key, "cache hit");
                return Ok(hit);
            }
        }

        let resp = self.send(method, path, query, body).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let bytes = resp.bytes().await.map_err(ClientError::from_transport)?;
        let payload: Value = serde_json::from_slice(&bytes)?;

        if cacheable {
            self.inner.cache.set(&key, payload.clone());
        }

        Ok(payload)
    }

    /// Issue a request whose response body is irrelevant (e.g. DELETE).
    pub async fn request_unit(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> Result<(), ClientError> {
        let resp = self.send(method, path, query, body).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Content-type conveniences
    // ========================================================================

    /// Fetch a filtered collection: `GET /api/{content_type}?<query>`.
    pub async fn find<T: DeserializeOwned>(
        &self,
        content_type: &str,
        query: &Query,
    ) -> Result<DocumentList<T>, ClientError> {
        let path = format!("api/{content_type}");
        let raw = self.request(Method::GET, &path, Some(query), None).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Fetch one entity by document identifier: `GET /api/{content_type}/{id}`.
    pub async fn find_one<T: DeserializeOwned>(
        &self,
        content_type: &str,
        document_id: &str,
        query: &Query,
    ) -> Result<Document<T>, ClientError> {
        let path = format!("api/{content_type}/{document_id}");
        let raw = self.request(Method::GET, &path, Some(query), None).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Fetch a single-type entity: `GET /api/{content_type}`.
    pub async fn find_single<T: DeserializeOwned>(
        &self,
        content_type: &str,
        query: &Query,
    ) -> Result<Document<T>, ClientError> {
        let path = format!("api/{content_type}");
        let raw = self.request(Method::GET, &path, Some(query), None).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// [`Self::find_single`] bypassing the response cache in both directions.
    ///
    /// For callers that keep their own cache with a shorter TTL; routing
    /// their refetches through the shared cache would stretch staleness to
    /// its TTL instead.
    pub async fn find_single_uncached<T: DeserializeOwned>(
        &self,
        content_type: &str,
        query: &Query,
    ) -> Result<Document<T>, ClientError> {
        let path = format!("api/{content_type}");
        let raw = self
            .execute(Method::GET, &path, Some(query), None, false)
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Create an entity: `POST /api/{content_type}` with `{ "data": ... }`.
    pub async fn create<T: DeserializeOwned>(
        &self,
        content_type: &str,
        attributes: Value,
    ) -> Result<Document<T>, ClientError> {
        let path = format!("api/{content_type}");
        let raw = self
            .request(
                Method::POST,
                &path,
                None,
                Some(serde_json::json!({ "data": attributes })),
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Update an entity: `PUT /api/{content_type}/{id}` with `{ "data": ... }`.
    pub async fn update<T: DeserializeOwned>(
        &self,
        content_type: &str,
        document_id: &str,
        attributes: Value,
    ) -> Result<Document<T>, ClientError> {
        let path = format!("api/{content_type}/{document_id}");
        let raw = self
            .request(
                Method::PUT,
                &path,
                None,
                Some(serde_json::json!({ "data": attributes })),
            )
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Delete an entity: `DELETE /api/{content_type}/{id}`.
    pub async fn delete(&self, content_type: &str, document_id: &str) -> Result<(), ClientError> {
        let path = format!("api/{content_type}/{document_id}");
        self.request_unit(Method::DELETE, &path, None, None).await
    }

    // ========================================================================
    // Service accessors and shared-state introspection
    // ========================================================================

    pub fn articles(&self) -> Articles {
        Articles::new(self.clone())
    }

    pub fn categories(&self) -> Categories {
        Categories::new(self.clone())
    }

    /// Requests accounted against the quota so far.
    pub fn requests_used(&self) -> u64 {
        self.inner.rate.used()
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }
}
