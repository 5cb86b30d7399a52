//! Content-type-specific services built on the request engine.
//!
//! Each service wraps [`crate::client::ContentClient`] with the default
//! query descriptions its content type wants (population graphs, sort order,
//! pagination). Services are cheap to construct; they clone the client and
//! therefore share its cache and quota state.

mod articles;
mod categories;
mod footer;

pub use articles::{ArticleListParams, Articles, MonthArchive, NewComment};
pub use categories::Categories;
pub use footer::FooterService;
