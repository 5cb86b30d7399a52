//! Footer single-type service.
//!
//! The footer renders on every page, so this service keeps its own
//! short-TTL cache keyed by locale, independent of the client's response
//! cache. Fetch failures degrade to `None` so page rendering never breaks
//! on footer trouble.

use std::time::Duration;

use tracing::warn;

use foglio_api_types::{Document, Footer};

use crate::cache::{CacheConfig, ResponseCache};
use crate::client::ContentClient;
use crate::query::{Populate, Query, Relation};

const SOURCE: &str = "services::footer";
const CONTENT_TYPE: &str = "footer";

const FOOTER_CACHE_TTL_SECS: u64 = 60;
const FOOTER_CACHE_MAX_ENTRIES: usize = 8;

pub struct FooterService {
    client: ContentClient,
    cache: ResponseCache,
}

impl FooterService {
    /// Construct with the service-local cache. Keep one instance around;
    /// a fresh instance starts with a cold cache.
    pub fn new(client: ContentClient) -> Self {
        Self {
            client,
            cache: ResponseCache::new(CacheConfig {
                enabled: true,
                ttl: Duration::from_secs(FOOTER_CACHE_TTL_SECS),
                max_entries: FOOTER_CACHE_MAX_ENTRIES,
            }),
        }
    }

    /// Fetch the footer, preferring the locale-keyed service cache.
    ///
    /// Returns `None` both when the single-type has no instance and when the
    /// fetch fails; failures are logged and swallowed.
    pub async fn get(&self, locale: Option<&str>) -> Option<Footer> {
        let cache_key = format!("footer_{}", locale.unwrap_or("default"));
        if let Some(hit) = self.cache.get(&cache_key) {
            return serde_json::from_value(hit).ok().flatten();
        }

        let mut query = Query::new().populate(Populate::nested([
            ("logo", Relation::all()),
            ("socialLinks", Relation::all()),
            ("menuLinks", Relation::all()),
            ("contactInfo", Relation::all()),
        ]));
        if let Some(locale) = locale {
            query = query.locale(locale);
        }

        // Bypass the client's response cache: its longer TTL would keep
        // serving the stale payload after this cache expired.
        let response: Document<Footer> = match self
            .client
            .find_single_uncached(CONTENT_TYPE, &query)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    target_module = SOURCE,
                    locale = locale.unwrap_or("default"),
                    error = %err,
                    "footer fetch failed"
                );
                return None;
            }
        };

        // Cache the absence too: a missing footer should not be re-fetched
        // on every page within the TTL.
        match serde_json::to_value(&response.data) {
            Ok(payload) => self.cache.set(&cache_key, payload),
            Err(err) => warn!(
                target_module = SOURCE,
                error = %err,
                "footer payload not cacheable"
            ),
        }

        response.data
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
