//! Attribute values and their normalization.
//!
//! Expected values are written down in tests using whatever native Rust
//! types are at hand (`42`, `123.0_f32`, `"bar"`), while log records,
//! resources and instrumentation scopes carry their values in OpenTelemetry's
//! value types. Both are first turned into a [`Dynamic`] value and then
//! normalized into an [`AttributeValue`], so that comparisons never depend on
//! numeric widths.
use crate::error::MatchError;
use opentelemetry::logs::AnyValue;
use opentelemetry::{Array, Value};
use std::collections::{BTreeMap, HashMap};

/// A value of any of the kinds tests and telemetry hand to the matchers,
/// before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dynamic {
    /// The absent value.
    #[default]
    Nil,
    /// A boolean
    Bool(bool),
    /// An 8-bit signed integer
    I8(i8),
    /// A 16-bit signed integer
    I16(i16),
    /// A 32-bit signed integer
    I32(i32),
    /// A 64-bit signed integer
    I64(i64),
    /// A pointer-sized signed integer
    Isize(isize),
    /// An 8-bit unsigned integer
    U8(u8),
    /// A 16-bit unsigned integer
    U16(u16),
    /// A 32-bit unsigned integer
    U32(u32),
    /// A 32-bit float
    F32(f32),
    /// A 64-bit float
    F64(f64),
    /// A string
    String(String),
    /// A byte sequence
    Bytes(Vec<u8>),
    /// An ordered sequence of values
    List(Vec<Dynamic>),
    /// A string-keyed mapping of values
    Map(HashMap<String, Dynamic>),
    /// A value of a type without an attribute value representation, named by
    /// its type name.
    Unsupported(&'static str),
}

impl Dynamic {
    /// Returns an unsupported value standing in for a value of type `T`.
    pub fn unsupported<T: ?Sized>() -> Self {
        Dynamic::Unsupported(std::any::type_name::<T>())
    }
}

macro_rules! impl_trivial_from {
    ($t:ty, $variant:path) => {
        impl From<$t> for Dynamic {
            fn from(val: $t) -> Dynamic {
                $variant(val.into())
            }
        }
    };
}

impl_trivial_from!(bool, Dynamic::Bool);

impl_trivial_from!(i8, Dynamic::I8);
impl_trivial_from!(i16, Dynamic::I16);
impl_trivial_from!(i32, Dynamic::I32);
impl_trivial_from!(i64, Dynamic::I64);
impl_trivial_from!(isize, Dynamic::Isize);

impl_trivial_from!(u8, Dynamic::U8);
impl_trivial_from!(u16, Dynamic::U16);
impl_trivial_from!(u32, Dynamic::U32);

impl_trivial_from!(f32, Dynamic::F32);
impl_trivial_from!(f64, Dynamic::F64);

impl_trivial_from!(String, Dynamic::String);
impl_trivial_from!(&str, Dynamic::String);

impl_trivial_from!(Vec<u8>, Dynamic::Bytes);
impl_trivial_from!(&[u8], Dynamic::Bytes);

impl_trivial_from!(Vec<Dynamic>, Dynamic::List);
impl_trivial_from!(HashMap<String, Dynamic>, Dynamic::Map);

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    /// `None` becomes [`Dynamic::Nil`].
    fn from(val: Option<T>) -> Dynamic {
        val.map_or(Dynamic::Nil, Into::into)
    }
}

impl From<&AnyValue> for Dynamic {
    fn from(value: &AnyValue) -> Self {
        match value {
            AnyValue::Int(v) => Dynamic::I64(*v),
            AnyValue::Double(v) => Dynamic::F64(*v),
            AnyValue::String(v) => Dynamic::String(v.as_str().to_owned()),
            AnyValue::Boolean(v) => Dynamic::Bool(*v),
            AnyValue::Bytes(v) => Dynamic::Bytes(v.to_vec()),
            AnyValue::ListAny(values) => {
                Dynamic::List(values.iter().map(Dynamic::from).collect())
            }
            AnyValue::Map(entries) => Dynamic::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.as_str().to_owned(), Dynamic::from(value)))
                    .collect(),
            ),
            _ => Dynamic::unsupported::<AnyValue>(),
        }
    }
}

impl From<&Value> for Dynamic {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(v) => Dynamic::Bool(*v),
            Value::I64(v) => Dynamic::I64(*v),
            Value::F64(v) => Dynamic::F64(*v),
            Value::String(v) => Dynamic::String(v.as_str().to_owned()),
            Value::Array(array) => match array {
                Array::Bool(vs) => Dynamic::List(vs.iter().copied().map(Dynamic::Bool).collect()),
                Array::I64(vs) => Dynamic::List(vs.iter().copied().map(Dynamic::I64).collect()),
                Array::F64(vs) => Dynamic::List(vs.iter().copied().map(Dynamic::F64).collect()),
                Array::String(vs) => Dynamic::List(
                    vs.iter()
                        .map(|v| Dynamic::String(v.as_str().to_owned()))
                        .collect(),
                ),
                _ => Dynamic::unsupported::<Array>(),
            },
            _ => Dynamic::unsupported::<Value>(),
        }
    }
}

/// A normalized attribute value.
///
/// Numeric values always have their canonical 64-bit width.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    /// The empty value
    #[default]
    Empty,
    /// A boolean value
    Bool(bool),
    /// An integer value
    Int(i64),
    /// A double value
    Double(f64),
    /// A string value
    String(String),
    /// A byte sequence
    Bytes(Vec<u8>),
    /// An ordered sequence of values
    Slice(Vec<AttributeValue>),
    /// A mapping of string keys to values, arbitrarily nested
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a [`Dynamic`] again; normalizing the result gives
    /// back an equal value.
    pub fn to_dynamic(&self) -> Dynamic {
        match self {
            AttributeValue::Empty => Dynamic::Nil,
            AttributeValue::Bool(v) => Dynamic::Bool(*v),
            AttributeValue::Int(v) => Dynamic::I64(*v),
            AttributeValue::Double(v) => Dynamic::F64(*v),
            AttributeValue::String(v) => Dynamic::String(v.clone()),
            AttributeValue::Bytes(v) => Dynamic::Bytes(v.clone()),
            AttributeValue::Slice(vs) => Dynamic::List(vs.iter().map(Self::to_dynamic).collect()),
            AttributeValue::Map(entries) => Dynamic::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_dynamic()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Normalizes a dynamic value into an [`AttributeValue`], widening all
/// numeric values to 64 bits. Sequences and mappings are normalized
/// element-wise; sequence order and mapping keys are preserved.
///
/// Fails with [`MatchError::UnsupportedValueKind`] as soon as any value,
/// however deeply nested, has no attribute value representation.
pub fn normalize(value: Dynamic) -> Result<AttributeValue, MatchError> {
    Ok(match value {
        Dynamic::Nil => AttributeValue::Empty,
        Dynamic::Bool(v) => AttributeValue::Bool(v),
        Dynamic::I8(v) => AttributeValue::Int(v.into()),
        Dynamic::I16(v) => AttributeValue::Int(v.into()),
        Dynamic::I32(v) => AttributeValue::Int(v.into()),
        Dynamic::I64(v) => AttributeValue::Int(v),
        Dynamic::Isize(v) => AttributeValue::Int(
            i64::try_from(v).map_err(|_| MatchError::UnsupportedValueKind("isize".into()))?,
        ),
        Dynamic::U8(v) => AttributeValue::Int(v.into()),
        Dynamic::U16(v) => AttributeValue::Int(v.into()),
        Dynamic::U32(v) => AttributeValue::Int(v.into()),
        Dynamic::F32(v) => AttributeValue::Double(v.into()),
        Dynamic::F64(v) => AttributeValue::Double(v),
        Dynamic::String(v) => AttributeValue::String(v),
        Dynamic::Bytes(v) => AttributeValue::Bytes(v),
        Dynamic::List(vs) => {
            AttributeValue::Slice(vs.into_iter().map(normalize).collect::<Result<_, _>>()?)
        }
        Dynamic::Map(entries) => AttributeValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| normalize(value).map(|value| (key, value)))
                .collect::<Result<_, _>>()?,
        ),
        Dynamic::Unsupported(kind) => {
            return Err(MatchError::UnsupportedValueKind(kind.to_owned()))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::StringValue;
    use rstest::rstest;

    #[rstest]
    #[case(Dynamic::Nil, AttributeValue::Empty)]
    #[case(true.into(), AttributeValue::Bool(true))]
    #[case(42_i8.into(), AttributeValue::Int(42))]
    #[case(42_i16.into(), AttributeValue::Int(42))]
    #[case(42_i32.into(), AttributeValue::Int(42))]
    #[case(42_i64.into(), AttributeValue::Int(42))]
    #[case(42_isize.into(), AttributeValue::Int(42))]
    #[case(42_u8.into(), AttributeValue::Int(42))]
    #[case(42_u32.into(), AttributeValue::Int(42))]
    #[case(123.0_f32.into(), AttributeValue::Double(123.0))]
    #[case(42.0_f64.into(), AttributeValue::Double(42.0))]
    #[case("foo".into(), AttributeValue::String("foo".into()))]
    #[case(b"foo".as_slice().into(), AttributeValue::Bytes(b"foo".to_vec()))]
    #[case(None::<i32>.into(), AttributeValue::Empty)]
    #[case(Some(7_i32).into(), AttributeValue::Int(7))]
    fn normalizes_scalars(#[case] value: Dynamic, #[case] expected: AttributeValue) {
        assert_eq!(normalize(value), Ok(expected));
    }

    #[test]
    fn normalizes_nested_values() {
        let value = Dynamic::List(vec![
            "untruth".into(),
            123.0_f32.into(),
            Dynamic::Nil,
            Dynamic::Map(HashMap::from([("baz".to_owned(), 42_i32.into())])),
        ]);
        assert_eq!(
            normalize(value),
            Ok(AttributeValue::Slice(vec![
                AttributeValue::String("untruth".into()),
                AttributeValue::Double(123.0),
                AttributeValue::Empty,
                AttributeValue::Map(BTreeMap::from([(
                    "baz".to_owned(),
                    AttributeValue::Int(42)
                )])),
            ]))
        );
    }

    #[test]
    fn fails_on_unsupported_kinds() {
        let err = normalize(Dynamic::unsupported::<fn()>()).unwrap_err();
        assert_eq!(err, MatchError::UnsupportedValueKind("fn()".into()));

        // nested deep down still fails the whole normalization.
        let value = Dynamic::Map(HashMap::from([(
            "foo".to_owned(),
            Dynamic::List(vec![1_i32.into(), Dynamic::unsupported::<std::sync::mpsc::Sender<()>>()]),
        )]));
        assert!(matches!(
            normalize(value),
            Err(MatchError::UnsupportedValueKind(_))
        ));
    }

    #[test]
    fn round_trips() {
        let values = [
            Dynamic::Nil,
            true.into(),
            42_i32.into(),
            1.5_f32.into(),
            "foo".into(),
            vec![1_u8, 2, 3].into(),
            Dynamic::List(vec!["a".into(), 1_i16.into()]),
            Dynamic::Map(HashMap::from([
                ("x".to_owned(), 2.0_f64.into()),
                ("y".to_owned(), Dynamic::List(vec![])),
            ])),
        ];
        for value in values {
            let normalized = normalize(value).expect("supported value");
            assert_eq!(normalize(normalized.to_dynamic()), Ok(normalized));
        }
    }

    #[test]
    fn converts_log_values() {
        let list: AnyValue = [AnyValue::from("barz"), AnyValue::from(666_i64)]
            .into_iter()
            .collect();
        assert_eq!(
            normalize(Dynamic::from(&list)),
            Ok(AttributeValue::Slice(vec!["barz".into(), 666_i64.into()]))
        );

        let map: AnyValue = [("foo", AnyValue::from("bar")), ("barz", AnyValue::from(123.0))]
            .into_iter()
            .collect();
        assert_eq!(
            normalize(Dynamic::from(&map)),
            Ok(AttributeValue::Map(BTreeMap::from([
                ("barz".to_owned(), AttributeValue::Double(123.0)),
                ("foo".to_owned(), AttributeValue::String("bar".into())),
            ])))
        );

        assert_eq!(
            normalize(Dynamic::from(&AnyValue::from(true))),
            Ok(AttributeValue::Bool(true))
        );
    }

    #[test]
    fn converts_attribute_values() {
        assert_eq!(
            normalize(Dynamic::from(&Value::from(42_i64))),
            Ok(AttributeValue::Int(42))
        );
        assert_eq!(
            normalize(Dynamic::from(&Value::from("foobar"))),
            Ok(AttributeValue::String("foobar".into()))
        );
        let strings = Value::Array(Array::String(vec![
            StringValue::from("a"),
            StringValue::from("b"),
        ]));
        assert_eq!(
            normalize(Dynamic::from(&strings)),
            Ok(AttributeValue::Slice(vec!["a".into(), "b".into()]))
        );
    }
}
