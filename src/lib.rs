//! Foglio: a typed, caching query client for headless CMS content APIs.
//!
//! The client wraps a remote REST content API with query-parameter
//! construction, a TTL- and size-bounded response cache, monthly quota
//! accounting, and content-type-specific services (articles, categories,
//! footer). It is a library: callers construct a [`ContentClient`] from
//! resolved [`config::Settings`] and pass it around explicitly; there is no
//! process-wide singleton.
//!
//! ```no_run
//! use foglio::{ContentClient, config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = config::load()?;
//! let client = ContentClient::new(&settings)?;
//!
//! let featured = client.articles().featured(6).await?;
//! println!("{} featured articles", featured.data.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod rate;
pub mod services;

pub use client::ContentClient;
pub use error::ClientError;
pub use query::{Pagination, Populate, Query, Relation};

pub use foglio_api_types as api_types;
