//! Document batch operations for the write endpoint.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_LANG: &str = "en";

/// A value stored in an indexed document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
    /// Sent as midnight UTC.
    Date(NaiveDate),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Wire representation; dates and times become epoch seconds.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Str(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::from(dt.timestamp()),
            Self::Date(date) => Value::from(date.and_time(NaiveTime::MIN).and_utc().timestamp()),
            Self::List(values) => Value::Array(values.iter().map(Self::to_json).collect()),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

field_value_from!(
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    DateTime<Utc> => DateTime,
    NaiveDate => Date,
);

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// What to do with fields whose value is [`FieldValue::Null`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullFieldPolicy {
    /// Send `""`, clearing the stored value.
    #[default]
    EmptyString,
    /// Leave the field out of the document.
    Omit,
}

/// One record of a document batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentOperation {
    Add {
        id: String,
        version: i64,
        lang: String,
        fields: Map<String, Value>,
    },
    Delete {
        id: String,
        version: i64,
    },
}

impl DocumentOperation {
    pub fn id(&self) -> &str {
        match self {
            Self::Add { id, .. } | Self::Delete { id, .. } => id,
        }
    }
}

/// Builds document operations with a fixed language and null policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEncoder {
    lang: String,
    null_fields: NullFieldPolicy,
}

impl Default for DocumentEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_LANG, NullFieldPolicy::default())
    }
}

impl DocumentEncoder {
    /// Encoder tagging added documents with `lang`.
    pub fn new(lang: impl Into<String>, null_fields: NullFieldPolicy) -> Self {
        Self {
            lang: lang.into(),
            null_fields,
        }
    }

    /// `add` operation for `id`. Versions must grow for the same id or CloudSearch ignores
    /// the write.
    pub fn add<I, K>(&self, id: impl Into<String>, fields: I, version: i64) -> DocumentOperation
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .filter_map(|(name, value)| match (value, self.null_fields) {
                (FieldValue::Null, NullFieldPolicy::Omit) => None,
                (FieldValue::Null, NullFieldPolicy::EmptyString) => {
                    Some((name.into(), Value::String(String::new())))
                }
                (value, _) => Some((name.into(), value.to_json())),
            })
            .collect();
        DocumentOperation::Add {
            id: id.into(),
            version,
            lang: self.lang.clone(),
            fields,
        }
    }

    /// Updates replace the whole document, so they share the add record shape.
    pub fn update<I, K>(&self, id: impl Into<String>, fields: I, version: i64) -> DocumentOperation
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.add(id, fields, version)
    }

    /// `delete` operation for `id`.
    pub fn delete(&self, id: impl Into<String>, version: i64) -> DocumentOperation {
        DocumentOperation::Delete {
            id: id.into(),
            version,
        }
    }
}
