use crate::containment::contains;
use crate::error::{MatchError, MatchResult};
use crate::matcher::{Expected, Matcher, Predicate, Subject};
use crate::scope::log_scopes;
use crate::value::{normalize, AttributeValue, Dynamic};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Test on the value of an attribute.
#[derive(Debug, Clone)]
pub enum ValueTest {
    /// The normalized attribute value must equal this value.
    Equals(AttributeValue),
    /// The attribute value must be empty.
    Empty,
    /// The normalized attribute value must satisfy this predicate.
    Satisfies(Predicate<AttributeValue>),
}

impl ValueTest {
    /// Tests a normalized attribute value.
    pub fn test(&self, actual: &AttributeValue) -> MatchResult {
        match self {
            ValueTest::Equals(expected) => Ok(expected == actual),
            ValueTest::Empty => Ok(matches!(actual, AttributeValue::Empty)),
            ValueTest::Satisfies(predicate) => predicate.test(actual),
        }
    }

    /// Builds a value test, normalizing literals. `Dynamic::Nil` asks for an
    /// empty value.
    pub fn new(expected: ExpectedValue) -> Result<Self, MatchError> {
        match expected {
            ExpectedValue::Literal(Dynamic::Nil) => Ok(ValueTest::Empty),
            ExpectedValue::Literal(literal) => normalize(literal)
                .map(ValueTest::Equals)
                .map_err(|err| {
                    MatchError::MalformedPredicate(format!(
                        "cannot test attribute values against it: {err}"
                    ))
                }),
            ExpectedValue::Satisfies(predicate) => Ok(ValueTest::Satisfies(predicate)),
        }
    }
}

/// An expected attribute value as given by the caller, before
/// normalization.
///
/// [`Dynamic::Nil`] (and `None`) asks for the empty value kind.
#[derive(Debug, Clone)]
pub enum ExpectedValue {
    /// A literal to be normalized and compared for equality.
    Literal(Dynamic),
    /// An arbitrary test on the normalized value.
    Satisfies(Predicate<AttributeValue>),
}

macro_rules! impl_literal_from {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for ExpectedValue {
                fn from(value: $t) -> Self {
                    ExpectedValue::Literal(value.into())
                }
            }
        )+
    };
}

impl_literal_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    Vec<u8>,
    Vec<Dynamic>,
    HashMap<String, Dynamic>,
    Dynamic,
);

impl<T: Into<Dynamic>> From<Option<T>> for ExpectedValue {
    fn from(value: Option<T>) -> Self {
        ExpectedValue::Literal(value.into())
    }
}

impl From<&AttributeValue> for ExpectedValue {
    fn from(value: &AttributeValue) -> Self {
        ExpectedValue::Literal(value.to_dynamic())
    }
}

impl From<Predicate<AttributeValue>> for ExpectedValue {
    fn from(predicate: Predicate<AttributeValue>) -> Self {
        ExpectedValue::Satisfies(predicate)
    }
}

type AttributeTest = dyn Fn(&str, &AttributeValue) -> MatchResult + Send + Sync;

/// A test on one attribute: its name and optionally its value, or an
/// arbitrary test relating both.
#[derive(Clone)]
pub struct AttributePredicate {
    test: PredicateTest,
}

#[derive(Clone)]
enum PredicateTest {
    Parts {
        name: Expected<str>,
        value: Option<ValueTest>,
    },
    Joint {
        description: Cow<'static, str>,
        test: Arc<AttributeTest>,
    },
}

impl AttributePredicate {
    /// Parses `name` or `name=value`.
    ///
    /// The first `=` separates the name from the value, which is then
    /// compared as a string. Without `=`, any attribute with that name
    /// matches.
    pub fn parse(pattern: &str) -> Self {
        match pattern.split_once('=') {
            Some((name, value)) => AttributePredicate::parts(
                name.into(),
                Some(ValueTest::Equals(value.into())),
            ),
            None => AttributePredicate::named(pattern),
        }
    }

    /// Matches any attribute whose name satisfies `name`.
    pub fn named(name: impl Into<Expected<str>>) -> Self {
        AttributePredicate::parts(name.into(), None)
    }

    /// Matches attributes whose name satisfies `name` and whose value
    /// satisfies `value`.
    ///
    /// Literal values are normalized here, so that for example an `f32`
    /// literal equals an `f64` attribute of the same magnitude. Literals
    /// without an attribute value representation are rejected with
    /// [`MatchError::MalformedPredicate`].
    pub fn with_value(
        name: impl Into<Expected<str>>,
        value: impl Into<ExpectedValue>,
    ) -> Result<Self, MatchError> {
        Ok(AttributePredicate::parts(
            name.into(),
            Some(ValueTest::new(value.into())?),
        ))
    }

    /// Matches attributes for which `test` holds, given the attribute name
    /// and its normalized value.
    pub fn satisfying<F>(description: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&str, &AttributeValue) -> MatchResult + Send + Sync + 'static,
    {
        AttributePredicate {
            test: PredicateTest::Joint {
                description: description.into(),
                test: Arc::new(test),
            },
        }
    }

    fn parts(name: Expected<str>, value: Option<ValueTest>) -> Self {
        AttributePredicate {
            test: PredicateTest::Parts { name, value },
        }
    }

    /// Tests a single attribute.
    pub fn matches(&self, name: &str, value: &AttributeValue) -> MatchResult {
        match &self.test {
            PredicateTest::Parts {
                name: expected_name,
                value: expected_value,
            } => {
                if !expected_name.test(name)? {
                    return Ok(false);
                }
                match expected_value {
                    Some(test) => test.test(value),
                    None => Ok(true),
                }
            }
            PredicateTest::Joint { test, .. } => test(name, value),
        }
    }
}

impl fmt::Debug for AttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            PredicateTest::Parts { name, value } => f
                .debug_struct("AttributePredicate")
                .field("name", name)
                .field("value", value)
                .finish(),
            PredicateTest::Joint { description, .. } => write!(f, "<{description}>"),
        }
    }
}

/// Matches a single attribute, or a log record carrying such an attribute
/// in any of its scopes.
#[derive(Debug, Clone)]
pub struct HaveAttribute {
    predicate: AttributePredicate,
}

/// Matches an attribute given as `name` or `name=value`, see
/// [`AttributePredicate::parse`].
pub fn have_attribute(pattern: &str) -> HaveAttribute {
    HaveAttribute {
        predicate: AttributePredicate::parse(pattern),
    }
}

/// Matches an attribute by name only, which may be a [`Predicate`].
pub fn have_attribute_named(name: impl Into<Expected<str>>) -> HaveAttribute {
    HaveAttribute {
        predicate: AttributePredicate::named(name),
    }
}

/// Matches an attribute by name and value, see
/// [`AttributePredicate::with_value`].
pub fn have_attribute_with_value(
    name: impl Into<Expected<str>>,
    value: impl Into<ExpectedValue>,
) -> Result<HaveAttribute, MatchError> {
    Ok(HaveAttribute {
        predicate: AttributePredicate::with_value(name, value)?,
    })
}

/// Matches an attribute for which `test` holds, see
/// [`AttributePredicate::satisfying`].
pub fn have_attribute_satisfying<F>(
    description: impl Into<Cow<'static, str>>,
    test: F,
) -> HaveAttribute
where
    F: Fn(&str, &AttributeValue) -> MatchResult + Send + Sync + 'static,
{
    HaveAttribute {
        predicate: AttributePredicate::satisfying(description, test),
    }
}

/// Matches values that equal `expected` after normalization.
///
/// Accepts a bare [`AnyValue`](opentelemetry::logs::AnyValue) subject, or an
/// attribute, whose value is then tested.
pub fn equals_value(expected: impl Into<ExpectedValue>) -> Result<EqualsValue, MatchError> {
    Ok(EqualsValue {
        expected: ValueTest::new(expected.into())?,
    })
}

/// Matcher returned by [`equals_value`].
#[derive(Debug, Clone)]
pub struct EqualsValue {
    expected: ValueTest,
}

impl Matcher for EqualsValue {
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        let value = match actual {
            Subject::Value(value) | Subject::Attribute { value, .. } => value,
            other => {
                return Err(MatchError::ActualTypeMismatch {
                    expected: "value or attribute",
                    actual: other.shape(),
                })
            }
        };
        self.expected.test(&normalize(Dynamic::from(value))?)
    }
}

impl Matcher for HaveAttribute {
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        match actual {
            Subject::Log(log) => contains(std::slice::from_ref(&self.predicate), &log_scopes(log)),
            Subject::Attribute { key, value } => {
                let value = normalize(Dynamic::from(value))?;
                self.predicate.matches(key, &value)
            }
            other => Err(MatchError::ActualTypeMismatch {
                expected: "log record or attribute",
                actual: other.shape(),
            }),
        }
    }

    fn attribute_predicate(&self) -> Option<AttributePredicate> {
        Some(self.predicate.clone())
    }

    fn failure_message(&self, actual: Subject<'_>) -> String {
        format!("Expected\n{actual:#?}\nto have attribute\n{:#?}", self.predicate)
    }

    fn negated_failure_message(&self, actual: Subject<'_>) -> String {
        format!("Expected\n{actual:#?}\nnot to have attribute\n{:#?}", self.predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{assert_matches, assert_not_matches};
    use opentelemetry::logs::AnyValue;
    use opentelemetry::Key;
    use rstest::rstest;

    fn attribute(key: &'static str, value: AnyValue) -> (Key, AnyValue) {
        (Key::new(key), value)
    }

    #[rstest]
    #[case("foo", true)]
    #[case("foo=bar", true)]
    #[case("foo=foo", false)]
    #[case("foo=", false)]
    #[case("bar", false)]
    fn parsed_predicates(#[case] pattern: &str, #[case] expected: bool) {
        let attribute = attribute("foo", AnyValue::from("bar"));
        assert_eq!(
            have_attribute(pattern).matches(Subject::from(&attribute)),
            Ok(expected)
        );
    }

    #[test]
    fn value_may_contain_the_separator() {
        let attribute = attribute("query", AnyValue::from("a=b"));
        assert_matches(&attribute, &have_attribute("query=a=b"));
        assert_not_matches(&attribute, &have_attribute("query=a"));
    }

    #[test]
    fn nil_value_asks_for_empty() {
        let matcher = have_attribute_with_value("foo", Dynamic::Nil).unwrap();
        let empty = (Key::new("foo"), AnyValue::String("".into()));
        assert_not_matches(&empty, &matcher);

        let none: Option<i64> = None;
        let matcher = have_attribute_with_value("foo", none).unwrap();
        assert_eq!(
            matcher.predicate.matches("foo", &AttributeValue::Empty),
            Ok(true)
        );
        assert_eq!(
            matcher.predicate.matches("foo", &AttributeValue::from("bar")),
            Ok(false)
        );
    }

    #[test]
    fn literals_are_widened() {
        assert_matches(
            &attribute("answer", AnyValue::Int(42)),
            &have_attribute_with_value("answer", 42_i32).unwrap(),
        );
        assert_matches(
            &attribute("ratio", AnyValue::Double(123.0)),
            &have_attribute_with_value("ratio", 123.0_f32).unwrap(),
        );
        assert_not_matches(
            &attribute("answer", AnyValue::Int(42)),
            &have_attribute_with_value("answer", "42").unwrap(),
        );
    }

    #[test]
    fn composite_literals() {
        let expected = vec![Dynamic::from(false), Dynamic::from(123.0_f32)];
        let matcher = have_attribute_with_value("list", expected).unwrap();
        let actual = AttributeValue::Slice(vec![
            AttributeValue::Bool(false),
            AttributeValue::Double(123.0),
        ]);
        assert_eq!(matcher.predicate.matches("list", &actual), Ok(true));
        assert_eq!(
            matcher
                .predicate
                .matches("list", &AttributeValue::Slice(vec![AttributeValue::Bool(false)])),
            Ok(false)
        );
    }

    #[test]
    fn unrepresentable_literals_are_malformed() {
        let err = have_attribute_with_value("foo", Dynamic::unsupported::<fn()>()).unwrap_err();
        assert!(matches!(err, MatchError::MalformedPredicate(_)), "{err}");
    }

    #[test]
    fn predicates_on_name_and_value() {
        let matcher = have_attribute_with_value(
            Predicate::<str>::new("starts with \"http.\"", |name| name.starts_with("http.")),
            Predicate::new("is a status code", |value: &AttributeValue| {
                matches!(value, AttributeValue::Int(100..=599))
            }),
        )
        .unwrap();
        assert_matches(&attribute("http.status", AnyValue::Int(404)), &matcher);
        assert_not_matches(&attribute("http.status", AnyValue::Int(42)), &matcher);
        assert_not_matches(&attribute("status", AnyValue::Int(404)), &matcher);
    }

    #[test]
    fn failing_name_predicate_is_an_error() {
        let matcher = have_attribute_named(Predicate::<str>::fallible("is true", |name| {
            Err(MatchError::Predicate(format!("expected a bool, got {name:?}")))
        }));
        assert_eq!(
            matcher.matches(Subject::from(&attribute("foo", AnyValue::from("bar")))),
            Err(MatchError::Predicate("expected a bool, got \"foo\"".into()))
        );
    }

    #[test]
    fn exposes_its_predicate() {
        assert!(have_attribute("foo").attribute_predicate().is_some());
    }

    #[test]
    fn failure_messages_show_the_predicate() {
        let attribute = attribute("foo", AnyValue::from("bar"));
        let matcher = have_attribute("foo=baz");
        let message = matcher.failure_message(Subject::from(&attribute));
        assert!(message.contains("to have attribute"), "{message}");
        assert!(message.contains("baz"), "{message}");
    }

    #[rstest]
    #[case(AnyValue::from("foo"), AnyValue::from("foo"), true)]
    #[case(AnyValue::from(42_i32), AnyValue::from(42_i64), true)]
    #[case(AnyValue::from("foo"), AnyValue::from("bar"), false)]
    #[case(AnyValue::from(42_i64), AnyValue::from(42.0_f64), false)]
    fn equal_values(#[case] actual: AnyValue, #[case] expected: AnyValue, #[case] equal: bool) {
        let matcher = equals_value(Dynamic::from(&expected)).unwrap();
        assert_eq!(matcher.matches(Subject::from(&actual)), Ok(equal));
    }

    #[test]
    fn equal_lists() {
        let actual: AnyValue = [AnyValue::from("bar"), AnyValue::from(42_i32)]
            .into_iter()
            .collect();
        assert_matches(
            &actual,
            &equals_value(vec![Dynamic::from("bar"), Dynamic::from(42_i64)]).unwrap(),
        );
        assert_not_matches(
            &actual,
            &equals_value(vec![Dynamic::from("barz"), Dynamic::from(42_i64)]).unwrap(),
        );
    }

    #[test]
    fn equals_value_tests_attribute_values() {
        let matcher = equals_value("bar").unwrap();
        assert_matches(&attribute("foo", AnyValue::from("bar")), &matcher);
        assert_not_matches(&attribute("bar", AnyValue::from("foo")), &matcher);
    }

    #[test]
    fn values_are_not_attributes() {
        let value = AnyValue::from("bar");
        assert_eq!(
            have_attribute("foo").matches(Subject::from(&value)),
            Err(MatchError::ActualTypeMismatch {
                expected: "log record or attribute",
                actual: "value",
            })
        );
    }

    #[test]
    fn joint_name_and_value_test() {
        // the value must repeat the attribute name
        let matcher = have_attribute_satisfying("value echoes name", |name, value| {
            Ok(value.as_str() == Some(name))
        });
        assert_matches(&attribute("foo", AnyValue::from("foo")), &matcher);
        assert_not_matches(&attribute("foo", AnyValue::from("bar")), &matcher);
        assert!(matcher.attribute_predicate().is_some());
        assert_eq!(format!("{:?}", matcher.predicate), "<value echoes name>");
    }
}
