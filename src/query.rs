//! Query descriptions and their canonical wire encoding.
//!
//! The remote content API accepts a bracket-keyed query string: filters and
//! population specs flatten to one parameter per leaf value
//! (`filters[featured][$eq]=true`, `populate[author][fields][0]=name`).
//! Encoding is deterministic (equal descriptions always produce identical
//! strings) because the serialized query doubles as the response cache key.

use serde_json::Value;
use url::form_urlencoded;

/// Structured description of a content API request.
///
/// Absent (`None` / empty) parts are skipped entirely. Filter trees keep
/// operator keys verbatim (`$eq`, `$in`, `$contains`, `$and`, `$or`, ...)
/// and serialize in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Option<Value>,
    pub sort: Vec<String>,
    pub pagination: Option<Pagination>,
    pub populate: Option<Populate>,
    pub fields: Vec<String>,
    pub locale: Option<String>,
}

/// Pagination in either page/pageSize or start/limit form.
///
/// When fields from both forms are set, page/pageSize takes precedence and
/// the offset form is not emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub start: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Population spec: eager-loading of related entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Populate {
    /// One level of every relation: `populate=*`.
    Wildcard,
    /// Named relations with all their fields: `populate[0]=author`.
    Fields(Vec<String>),
    /// Per-relation specs, arbitrarily nested.
    Nested(Vec<(String, Relation)>),
}

impl Populate {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fields(names.into_iter().map(Into::into).collect())
    }

    pub fn nested<I, S>(relations: I) -> Self
    where
        I: IntoIterator<Item = (S, Relation)>,
        S: Into<String>,
    {
        Self::Nested(
            relations
                .into_iter()
                .map(|(name, rel)| (name.into(), rel))
                .collect(),
        )
    }
}

/// Spec for a single populated relation. An empty spec means "everything":
/// it serializes as `populate[name]=true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    pub fields: Vec<String>,
    pub sort: Vec<String>,
    pub filters: Option<Value>,
    pub populate: Option<Box<Populate>>,
}

impl Relation {
    /// Populate the relation with all of its scalar fields.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate = Some(Box::new(populate));
        self
    }

    fn is_all(&self) -> bool {
        self.fields.is_empty()
            && self.sort.is_empty()
            && self.filters.is_none()
            && self.populate.is_none()
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn sort<S: Into<String>>(mut self, token: S) -> Self {
        self.sort.push(token.into());
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate = Some(populate);
        self
    }

    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn locale<S: Into<String>>(mut self, locale: S) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_none()
            && self.sort.is_empty()
            && self.pagination.is_none()
            && self.populate.is_none()
            && self.fields.is_empty()
            && self.locale.is_none()
    }

    /// Flatten the description into ordered key/value pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(filters) = &self.filters {
            flatten_value("filters", filters, &mut pairs);
        }

        if !self.sort.is_empty() {
            pairs.push(("sort".to_string(), self.sort.join(",")));
        }

        if let Some(pagination) = &self.pagination {
            flatten_pagination(pagination, &mut pairs);
        }

        if let Some(populate) = &self.populate {
            flatten_populate("populate", populate, &mut pairs);
        }

        for (index, field) in self.fields.iter().enumerate() {
            pairs.push((format!("fields[{index}]"), field.clone()));
        }

        if let Some(locale) = &self.locale {
            pairs.push(("locale".to_string(), locale.clone()));
        }

        pairs
    }

    /// Canonical percent-encoded query string.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_pairs() {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }
}

fn flatten_pagination(pagination: &Pagination, pairs: &mut Vec<(String, String)>) {
    // Page form wins over the offset form when the caller set both.
    if pagination.page.is_some() || pagination.page_size.is_some() {
        if let Some(page) = pagination.page {
            pairs.push(("pagination[page]".to_string(), page.to_string()));
        }
        if let Some(page_size) = pagination.page_size {
            pairs.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        }
        return;
    }
    if let Some(start) = pagination.start {
        pairs.push(("pagination[start]".to_string(), start.to_string()));
    }
    if let Some(limit) = pagination.limit {
        pairs.push(("pagination[limit]".to_string(), limit.to_string()));
    }
}

fn flatten_populate(prefix: &str, populate: &Populate, pairs: &mut Vec<(String, String)>) {
    match populate {
        Populate::Wildcard => pairs.push((prefix.to_string(), "*".to_string())),
        Populate::Fields(names) => {
            for (index, name) in names.iter().enumerate() {
                pairs.push((format!("{prefix}[{index}]"), name.clone()));
            }
        }
        Populate::Nested(relations) => {
            for (name, relation) in relations {
                flatten_relation(&format!("{prefix}[{name}]"), relation, pairs);
            }
        }
    }
}

fn flatten_relation(prefix: &str, relation: &Relation, pairs: &mut Vec<(String, String)>) {
    if relation.is_all() {
        pairs.push((prefix.to_string(), "true".to_string()));
        return;
    }
    for (index, field) in relation.fields.iter().enumerate() {
        pairs.push((format!("{prefix}[fields][{index}]"), field.clone()));
    }
    if !relation.sort.is_empty() {
        pairs.push((format!("{prefix}[sort]"), relation.sort.join(",")));
    }
    if let Some(filters) = &relation.filters {
        flatten_value(&format!("{prefix}[filters]"), filters, pairs);
    }
    if let Some(populate) = &relation.populate {
        flatten_populate(&format!("{prefix}[populate]"), populate, pairs);
    }
}

/// Flatten an ordered JSON tree into bracket-keyed pairs, one per leaf.
///
/// Explicit `null` serializes as the literal `null`; only absent values are
/// skipped, and absence is expressed by leaving the key out of the tree.
fn flatten_value(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                flatten_value(&format!("{prefix}[{key}]"), inner, pairs);
            }
        }
        Value::Array(items) => {
            for (index, inner) in items.iter().enumerate() {
                flatten_value(&format!("{prefix}[{index}]"), inner, pairs);
            }
        }
        Value::Null => pairs.push((prefix.to_string(), "null".to_string())),
        Value::Bool(b) => pairs.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => pairs.push((prefix.to_string(), n.to_string())),
        Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_query_encodes_to_empty_string() {
        assert!(Query::new().is_empty());
        assert_eq!(Query::new().encode(), "");
    }

    #[test]
    fn filters_flatten_to_bracket_keys() {
        let query = Query::new().filters(json!({
            "featured": { "$eq": true },
            "publishedAt": { "$gte": "2026-01-01" }
        }));

        assert_eq!(
            query.to_pairs(),
            vec![
                ("filters[featured][$eq]".to_string(), "true".to_string()),
                (
                    "filters[publishedAt][$gte]".to_string(),
                    "2026-01-01".to_string()
                ),
            ]
        );
    }

    #[test]
    fn filter_arrays_use_index_segments() {
        let query = Query::new().filters(json!({
            "$or": [
                { "title": { "$contains": "rust" } },
                { "content": { "$contains": "rust" } }
            ]
        }));

        assert_eq!(
            query.to_pairs(),
            vec![
                (
                    "filters[$or][0][title][$contains]".to_string(),
                    "rust".to_string()
                ),
                (
                    "filters[$or][1][content][$contains]".to_string(),
                    "rust".to_string()
                ),
            ]
        );
    }

    #[test]
    fn explicit_null_serializes_as_literal() {
        let query = Query::new().filters(json!({ "author": { "$eq": null } }));
        assert_eq!(
            query.to_pairs(),
            vec![("filters[author][$eq]".to_string(), "null".to_string())]
        );
    }

    #[test]
    fn sort_tokens_join_with_commas() {
        let query = Query::new().sort("publishedAt:desc").sort("title:asc");
        assert_eq!(
            query.to_pairs(),
            vec![("sort".to_string(), "publishedAt:desc,title:asc".to_string())]
        );
    }

    #[test]
    fn page_form_wins_when_both_pagination_forms_are_set() {
        let query = Query::new().pagination(Pagination {
            page: Some(2),
            page_size: Some(10),
            start: Some(0),
            limit: Some(50),
        });

        assert_eq!(
            query.to_pairs(),
            vec![
                ("pagination[page]".to_string(), "2".to_string()),
                ("pagination[pageSize]".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn offset_form_emits_when_page_form_is_absent() {
        let query = Query::new().pagination(Pagination {
            start: Some(20),
            limit: Some(10),
            ..Pagination::default()
        });

        assert_eq!(
            query.to_pairs(),
            vec![
                ("pagination[start]".to_string(), "20".to_string()),
                ("pagination[limit]".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn populate_wildcard_and_field_list() {
        assert_eq!(
            Query::new().populate(Populate::Wildcard).to_pairs(),
            vec![("populate".to_string(), "*".to_string())]
        );

        assert_eq!(
            Query::new()
                .populate(Populate::fields(["author", "cover"]))
                .to_pairs(),
            vec![
                ("populate[0]".to_string(), "author".to_string()),
                ("populate[1]".to_string(), "cover".to_string()),
            ]
        );
    }

    #[test]
    fn nested_populate_flattens_recursively() {
        let query = Query::new().populate(Populate::nested([
            (
                "author",
                Relation::with_fields(["name"]).populate(Populate::fields(["avatar"])),
            ),
            ("category", Relation::all()),
        ]));

        assert_eq!(
            query.to_pairs(),
            vec![
                (
                    "populate[author][fields][0]".to_string(),
                    "name".to_string()
                ),
                (
                    "populate[author][populate][0]".to_string(),
                    "avatar".to_string()
                ),
                ("populate[category]".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn relation_filters_and_sort_are_emitted() {
        let query = Query::new().populate(Populate::nested([(
            "comments",
            Relation {
                filters: Some(json!({ "approved": { "$eq": true } })),
                sort: vec!["createdAt:desc".to_string()],
                ..Relation::default()
            },
        )]));

        assert_eq!(
            query.to_pairs(),
            vec![
                (
                    "populate[comments][sort]".to_string(),
                    "createdAt:desc".to_string()
                ),
                (
                    "populate[comments][filters][approved][$eq]".to_string(),
                    "true".to_string()
                ),
            ]
        );
    }

    #[test]
    fn equal_descriptions_encode_identically() {
        let build = || {
            Query::new()
                .filters(json!({ "slug": { "$eq": "my-post" } }))
                .sort("publishedAt:desc")
                .pagination(Pagination::page(1, 6))
                .fields(["title", "slug"])
        };
        assert_eq!(build().encode(), build().encode());
    }

    #[test]
    fn differing_descriptions_encode_differently() {
        let base = Query::new().filters(json!({ "slug": { "$eq": "a" } }));
        let other = Query::new().filters(json!({ "slug": { "$eq": "b" } }));
        assert_ne!(base.encode(), other.encode());
    }

    #[test]
    fn key_order_follows_insertion_order() {
        let query = Query::new().filters(json!({
            "zeta": { "$eq": 1 },
            "alpha": { "$eq": 2 }
        }));

        let keys: Vec<String> = query.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["filters[zeta][$eq]", "filters[alpha][$eq]"]);
    }

    #[test]
    fn encode_percent_escapes_reserved_characters() {
        let query = Query::new().filters(json!({ "title": { "$contains": "a b&c" } }));
        let encoded = query.encode();
        assert!(encoded.contains("filters%5Btitle%5D%5B%24contains%5D=a+b%26c"));
    }
}
