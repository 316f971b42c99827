use std::ops::{Bound, Range, RangeFrom, RangeInclusive, RangeTo, RangeToInclusive};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{CompileError, FilterExpression, FilterValue};

/// One end of a [`RangeSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum RangeEndpoint {
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
}

/// Lower and upper bounds of a range filter. Either side may be open.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    lower: Bound<RangeEndpoint>,
    upper: Bound<RangeEndpoint>,
}

impl RangeSpec {
    pub const fn new(lower: Bound<RangeEndpoint>, upper: Bound<RangeEndpoint>) -> Self {
        Self { lower, upper }
    }

    /// Inclusive on both ends.
    pub fn between(lower: impl Into<RangeEndpoint>, upper: impl Into<RangeEndpoint>) -> Self {
        Self::new(Bound::Included(lower.into()), Bound::Included(upper.into()))
    }

    pub fn at_least(lower: impl Into<RangeEndpoint>) -> Self {
        Self::new(Bound::Included(lower.into()), Bound::Unbounded)
    }

    pub fn at_most(upper: impl Into<RangeEndpoint>) -> Self {
        Self::new(Bound::Unbounded, Bound::Included(upper.into()))
    }

    pub fn below(upper: impl Into<RangeEndpoint>) -> Self {
        Self::new(Bound::Unbounded, Bound::Excluded(upper.into()))
    }

    /// Open on both ends; rejected by the compiler.
    pub const fn unbounded() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    pub const fn lower(&self) -> &Bound<RangeEndpoint> {
        &self.lower
    }

    pub const fn upper(&self) -> &Bound<RangeEndpoint> {
        &self.upper
    }

    pub(crate) fn is_unbounded(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    pub(crate) fn has_non_finite(&self) -> bool {
        [&self.lower, &self.upper].into_iter().any(|bound| {
            matches!(
                bound,
                Bound::Included(RangeEndpoint::Float(f)) | Bound::Excluded(RangeEndpoint::Float(f))
                    if !f.is_finite()
            )
        })
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RangeEndpoint {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }

            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for RangeEndpoint {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for RangeEndpoint {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for RangeEndpoint {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for RangeEndpoint {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DateTime<Utc>> for RangeEndpoint {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for FilterValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<RangeSpec> for FilterValue {
    fn from(value: RangeSpec) -> Self {
        Self::Range(value)
    }
}

impl From<FilterExpression> for FilterValue {
    fn from(value: FilterExpression) -> Self {
        Self::Expr(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RangeEndpoint>> From<RangeInclusive<T>> for FilterValue {
    fn from(range: RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        Self::Range(RangeSpec::between(start, end))
    }
}

impl<T: Into<RangeEndpoint>> From<Range<T>> for FilterValue {
    fn from(range: Range<T>) -> Self {
        Self::Range(RangeSpec::new(
            Bound::Included(range.start.into()),
            Bound::Excluded(range.end.into()),
        ))
    }
}

impl<T: Into<RangeEndpoint>> From<RangeFrom<T>> for FilterValue {
    fn from(range: RangeFrom<T>) -> Self {
        Self::Range(RangeSpec::at_least(range.start))
    }
}

impl<T: Into<RangeEndpoint>> From<RangeTo<T>> for FilterValue {
    fn from(range: RangeTo<T>) -> Self {
        Self::Range(RangeSpec::below(range.end))
    }
}

impl<T: Into<RangeEndpoint>> From<RangeToInclusive<T>> for FilterValue {
    fn from(range: RangeToInclusive<T>) -> Self {
        Self::Range(RangeSpec::at_most(range.end))
    }
}

/// JSON numbers must fit an `i64` or be a float; larger unsigned integers are rejected
/// rather than rounded.
impl TryFrom<Value> for FilterValue {
    type Error = CompileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(int), _) => Self::Int(int),
                (None, Some(float)) if n.is_f64() => Self::Float(float),
                _ => return Err(CompileError::IntegerOutOfRange(n.to_string())),
            },
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Self::Expr(Value::Object(map).try_into()?),
        })
    }
}

/// Only JSON objects are expressions.
impl TryFrom<Value> for FilterExpression {
    type Error = CompileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| FilterValue::try_from(value).map(|value| (key, value)))
                .collect(),
            other => Err(CompileError::NotAnExpression(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_std_ranges_map_to_bounds() {
        let FilterValue::Range(range) = FilterValue::from(1..5) else {
            panic!("expected a range");
        };
        assert_eq!(range.lower(), &Bound::Included(RangeEndpoint::Int(1)));
        assert_eq!(range.upper(), &Bound::Excluded(RangeEndpoint::Int(5)));

        assert_eq!(
            FilterValue::from(..=2.5),
            FilterValue::Range(RangeSpec::at_most(2.5))
        );
        assert_eq!(
            FilterValue::from(3..),
            FilterValue::Range(RangeSpec::at_least(3))
        );
    }

    #[test]
    fn test_options_and_json() {
        assert_eq!(FilterValue::from(None::<&str>), FilterValue::Null);
        assert_eq!(FilterValue::from(Some(7)), FilterValue::Int(7));
        assert_eq!(
            FilterValue::try_from(json!([1, "a", null, 1.5])).unwrap(),
            FilterValue::List(vec![
                FilterValue::Int(1),
                FilterValue::Str("a".into()),
                FilterValue::Null,
                FilterValue::Float(1.5),
            ])
        );
        assert_eq!(
            FilterExpression::try_from(json!("plain")),
            Err(CompileError::NotAnExpression("\"plain\"".into()))
        );
    }

    #[test]
    fn test_json_integers_beyond_i64_are_rejected() {
        assert_eq!(
            FilterValue::try_from(json!(18446744073709551615u64)),
            Err(CompileError::IntegerOutOfRange("18446744073709551615".into()))
        );
        assert_eq!(
            FilterExpression::try_from(json!({"and": {"doc_id": [1, 18446744073709551615u64]}})),
            Err(CompileError::IntegerOutOfRange("18446744073709551615".into()))
        );
        assert_eq!(
            FilterValue::try_from(json!(9223372036854775807u64)).unwrap(),
            FilterValue::Int(i64::MAX)
        );
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(RangeSpec::at_least(f64::INFINITY).has_non_finite());
        assert!(!RangeSpec::between(1, 2).has_non_finite());
        assert!(RangeSpec::unbounded().is_unbounded());
    }
}
