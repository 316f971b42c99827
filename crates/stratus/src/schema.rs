use indexmap::IndexMap;

use crate::{document::FieldValue, request::SearchOptions};

pub const DEFAULT_ID_FIELD: &str = "id";

/// The indexed fields of one logical index, as configured by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<String>,
    pub id_field: String,
}

impl IndexSchema {
    /// Schema for `name` indexing `fields`, keyed by [`DEFAULT_ID_FIELD`].
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            id_field: DEFAULT_ID_FIELD.to_owned(),
        }
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Configured fields followed by the id field.
    pub fn return_fields(&self) -> Vec<String> {
        let mut fields = self.fields.clone();
        if !fields.contains(&self.id_field) {
            fields.push(self.id_field.clone());
        }
        fields
    }

    /// Keep only the indexed fields of `record`. Missing fields are sent as nulls.
    pub fn project(&self, record: &IndexMap<String, FieldValue>) -> IndexMap<String, FieldValue> {
        self.return_fields()
            .into_iter()
            .map(|field| {
                let value = record.get(&field).cloned().unwrap_or(FieldValue::Null);
                (field, value)
            })
            .collect()
    }

    /// Search options returning every indexed field.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::new().return_fields(self.return_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> IndexSchema {
        IndexSchema::new("Event", ["name", "venue"]).with_id_field("event_id")
    }

    #[test]
    fn test_return_fields_include_id() {
        assert_eq!(
            events().return_fields(),
            ["name", "venue", "event_id"]
        );
        assert_eq!(
            IndexSchema::new("Tag", ["id", "label"]).return_fields(),
            ["id", "label"]
        );
    }

    #[test]
    fn test_project_keeps_indexed_fields() {
        let record: IndexMap<String, FieldValue> = [
            ("name".to_owned(), FieldValue::from("Gig")),
            ("secret".to_owned(), FieldValue::from("hunter2")),
            ("event_id".to_owned(), FieldValue::Int(4)),
        ]
        .into_iter()
        .collect();
        let projected = events().project(&record);
        assert_eq!(
            projected.keys().collect::<Vec<_>>(),
            ["name", "venue", "event_id"]
        );
        assert_eq!(projected["venue"], FieldValue::Null);
        assert!(!projected.contains_key("secret"));
    }

    #[test]
    fn test_search_options_request_indexed_fields() {
        assert_eq!(
            events().search_options().return_fields,
            ["name", "venue", "event_id"]
        );
    }
}
