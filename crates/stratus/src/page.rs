//! Paginated search results.

use std::{ops::Deref, slice};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::request::DEFAULT_PAGE_SIZE;

/// One page of a larger result set.
///
/// The payload is reachable through [`Deref`], so a `Page<Vec<T>>` can be iterated like the
/// vector it wraps while still answering pagination questions.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: T,
    total_entries: u64,
    page_size: u64,
    current_page: u64,
}

pub type SearchPage = Page<Hits>;

impl<T> Page<T> {
    /// `page_size` and `current_page` are clamped to at least 1.
    pub fn new(items: T, total_entries: u64, page_size: u64, current_page: u64) -> Self {
        Self {
            items,
            total_entries,
            page_size: page_size.max(1),
            current_page: current_page.max(1),
        }
    }

    /// Build a page from the offset of its first entry.
    pub fn from_start(items: T, total_entries: u64, page_size: u64, start: u64) -> Self {
        let page_size = page_size.max(1);
        Self::new(items, total_entries, page_size, start / page_size + 1)
    }

    pub const fn items(&self) -> &T {
        &self.items
    }

    pub fn into_items(self) -> T {
        self.items
    }

    pub const fn total_entries(&self) -> u64 {
        self.total_entries
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    pub const fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Never less than 1, even for an empty result set.
    pub const fn total_pages(&self) -> u64 {
        let pages = self.total_entries.div_ceil(self.page_size);
        if pages == 0 { 1 } else { pages }
    }

    pub const fn offset(&self) -> u64 {
        (self.current_page - 1).saturating_mul(self.page_size)
    }

    pub fn next_page(&self) -> Option<u64> {
        (self.current_page < self.total_pages()).then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// Swap the payload, keeping the pagination metadata.
    pub fn replace<U>(self, items: U) -> Page<U> {
        Page {
            items,
            total_entries: self.total_entries,
            page_size: self.page_size,
            current_page: self.current_page,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Page<U> {
        let Self {
            items,
            total_entries,
            page_size,
            current_page,
        } = self;
        Page {
            items: f(items),
            total_entries,
            page_size,
            current_page,
        }
    }
}

impl<T> Deref for Page<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// The hits of a search page.
#[derive(Debug, Clone, PartialEq)]
pub enum Hits {
    /// Hits carried no field data.
    Ids(Vec<String>),
    /// Hits keyed by id, in result order.
    Documents(IndexMap<String, HitFields>),
}

impl Hits {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Documents(documents) => documents.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::Ids(ids) => Box::new(ids.iter().map(String::as_str)),
            Self::Documents(documents) => Box::new(documents.keys().map(String::as_str)),
        }
    }
}

/// Field values returned with a hit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct HitFields(Map<String, Value>);

impl HitFields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// First value of a field. Multi-valued fields arrive as arrays.
    pub fn first(&self, name: &str) -> Option<&Value> {
        match self.0.get(name)? {
            Value::Array(values) => values.first(),
            value => Some(value),
        }
    }

    /// Every value of a field.
    pub fn all(&self, name: &str) -> &[Value] {
        match self.0.get(name) {
            Some(Value::Array(values)) => values,
            Some(value) => slice::from_ref(value),
            None => &[],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawResponse {
    hits: RawHits,
}

#[derive(Deserialize)]
struct RawHits {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    start: u64,
    #[serde(default)]
    hit: Vec<RawHit>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHit {
    Id(String),
    Document {
        id: String,
        #[serde(default)]
        data: Option<HitFields>,
        #[serde(default)]
        fields: Option<HitFields>,
    },
}

impl Page<Hits> {
    /// Parse a search response body. The response carries no page size, so the caller
    /// supplies the one it requested.
    pub fn from_json(body: &str, page_size: u64) -> Result<Self, serde_json::Error> {
        let RawResponse { hits } = serde_json::from_str(body)?;
        let with_fields = hits.hit.iter().any(|hit| {
            matches!(
                hit,
                RawHit::Document { data: Some(_), .. } | RawHit::Document { fields: Some(_), .. }
            )
        });

        let items = if with_fields {
            Hits::Documents(
                hits.hit
                    .into_iter()
                    .map(|hit| match hit {
                        RawHit::Id(id) => (id, HitFields::default()),
                        RawHit::Document { id, data, fields } => {
                            (id, data.or(fields).unwrap_or_default())
                        }
                    })
                    .collect(),
            )
        } else {
            Hits::Ids(
                hits.hit
                    .into_iter()
                    .map(|hit| match hit {
                        RawHit::Id(id) | RawHit::Document { id, .. } => id,
                    })
                    .collect(),
            )
        };
        Ok(Self::from_start(items, hits.found, page_size, hits.start))
    }

    /// The empty page returned when no live index is available.
    pub fn sandbox() -> Self {
        Self::new(Hits::Ids(Vec::new()), 0, DEFAULT_PAGE_SIZE, 1)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn response(found: u64, start: u64, hit: &Value) -> String {
        json!({ "rank": "-text_relevance", "hits": { "found": found, "start": start, "hit": hit } })
            .to_string()
    }

    #[test]
    fn test_empty_results_have_one_page() {
        let page = SearchPage::from_json(&response(0, 0, &json!([])), 10).unwrap();
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.offset(), 0);
        assert!(page.is_empty());
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn test_page_arithmetic() {
        let page = SearchPage::from_json(&response(10, 0, &json!([])), 2).unwrap();
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.next_page(), Some(2));
        assert_eq!(page.previous_page(), None);

        let last = SearchPage::from_json(&response(10, 8, &json!([])), 2).unwrap();
        assert_eq!(last.current_page(), 5);
        assert_eq!(last.offset(), 8);
        assert_eq!(last.previous_page(), Some(4));

        let partial = SearchPage::from_json(&response(11, 0, &json!([])), 2).unwrap();
        assert_eq!(partial.total_pages(), 6);
    }

    #[test]
    fn test_ids_when_hits_have_no_fields() {
        let hits = json!([{ "id": "123" }, { "id": "456" }]);
        let page = SearchPage::from_json(&response(2, 0, &hits), 10).unwrap();
        assert_eq!(page.items(), &Hits::Ids(vec!["123".into(), "456".into()]));
    }

    #[test]
    fn test_bare_string_hits() {
        let page = SearchPage::from_json(&response(1, 0, &json!(["abc"])), 10).unwrap();
        assert_eq!(page.ids().collect::<Vec<_>>(), ["abc"]);
    }

    #[test]
    fn test_documents_when_hits_carry_fields() {
        let hits = json!([
            { "id": "123", "data": { "name": ["Beavis"], "tags": ["a", "b"] } },
            { "id": "456", "fields": { "name": "Butthead" } },
            { "id": "789" }
        ]);
        let page = SearchPage::from_json(&response(3, 0, &hits), 10).unwrap();
        let Hits::Documents(documents) = page.items() else {
            panic!("expected documents");
        };
        assert_eq!(
            documents.keys().collect::<Vec<_>>(),
            ["123", "456", "789"]
        );
        assert_eq!(documents["123"].first("name"), Some(&json!("Beavis")));
        assert_eq!(documents["123"].all("tags").len(), 2);
        assert_eq!(documents["456"].all("name"), [json!("Butthead")]);
        assert_eq!(documents["789"], HitFields::default());
        assert!(documents["789"].all("name").is_empty());
    }

    #[test]
    fn test_replace_keeps_metadata() {
        let page = SearchPage::from_json(&response(30, 10, &json!(["1", "2"])), 10).unwrap();
        let replaced = page.replace(vec![1_u32, 2]);
        assert_eq!(replaced.current_page(), 2);
        assert_eq!(replaced.total_pages(), 3);
        assert_eq!(replaced.iter().sum::<u32>(), 3);

        let mapped = replaced.map(|items| items.len());
        assert_eq!(*mapped, 2);
        assert_eq!(mapped.total_entries(), 30);
    }

    #[test]
    fn test_sandbox_page() {
        let page = SearchPage::sandbox();
        assert_eq!(page.total_entries(), 0);
        assert_eq!(page.page_size(), 10);
        assert_eq!(page.total_pages(), 1);
        assert!(page.is_empty());
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        assert!(SearchPage::from_json("<html>", 10).is_err());
        assert!(SearchPage::from_json("{\"error\": 1}", 10).is_err());
    }

    proptest! {
        #[test]
        fn prop_pagination_invariants(total in 0u64..10_000, size in 1u64..200, start in 0u64..10_000) {
            let page = Page::from_start((), total, size, start);
            prop_assert!(page.total_pages() >= 1);
            prop_assert!(page.total_pages() * size >= total);
            prop_assert_eq!(page.current_page(), start / size + 1);
            prop_assert!(page.offset() <= start);
            prop_assert!(start - page.offset() < size);
        }
    }
}
