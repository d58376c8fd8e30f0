use crate::attribute::AttributePredicate;
use crate::error::{MatchError, MatchResult};
use opentelemetry::logs::{AnyValue, Severity};
use opentelemetry::Key;
use opentelemetry_chanlog::ExportedLog;
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

type TestFn<T> = dyn Fn(&T) -> MatchResult + Send + Sync;

/// An arbitrary, described test on a value of type `T`.
///
/// # Example
///
/// ```
/// use opentelemetry_logcheck::Predicate;
///
/// let prefixed = Predicate::<str>::new("has prefix \"unknown_service\"", |name| {
///     name.starts_with("unknown_service")
/// });
/// assert_eq!(prefixed.test("unknown_service:foo"), Ok(true));
/// ```
pub struct Predicate<T: ?Sized> {
    description: Cow<'static, str>,
    test: Arc<TestFn<T>>,
}

impl<T: ?Sized> Predicate<T> {
    /// Creates a predicate from an infallible test.
    pub fn new<F>(description: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::fallible(description, move |actual| Ok(test(actual)))
    }

    /// Creates a predicate from a test that may fail to evaluate. Errors
    /// abort the whole match they occur in.
    pub fn fallible<F>(description: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&T) -> MatchResult + Send + Sync + 'static,
    {
        Predicate {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    /// Runs the test.
    pub fn test(&self, actual: &T) -> MatchResult {
        (self.test)(actual)
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T: ?Sized> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.description)
    }
}

/// An expectation on a single field: either an exact value, or a
/// [`Predicate`].
pub enum Expected<T: ?Sized + ToOwned> {
    /// The field must equal this value.
    Equals(T::Owned),
    /// The field must satisfy this predicate.
    Satisfies(Predicate<T>),
}

impl<T: ?Sized + ToOwned + PartialEq> Expected<T> {
    /// Tests `actual` against this expectation.
    pub fn test(&self, actual: &T) -> MatchResult {
        match self {
            Expected::Equals(expected) => Ok(Borrow::<T>::borrow(expected) == actual),
            Expected::Satisfies(predicate) => predicate.test(actual),
        }
    }
}

impl<T: ?Sized + ToOwned> Clone for Expected<T>
where
    T::Owned: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Expected::Equals(expected) => Expected::Equals(expected.clone()),
            Expected::Satisfies(predicate) => Expected::Satisfies(predicate.clone()),
        }
    }
}

impl<T: ?Sized + ToOwned> fmt::Debug for Expected<T>
where
    T::Owned: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Equals(expected) => expected.fmt(f),
            Expected::Satisfies(predicate) => predicate.fmt(f),
        }
    }
}

impl<T: ?Sized + ToOwned> From<Predicate<T>> for Expected<T> {
    fn from(predicate: Predicate<T>) -> Self {
        Expected::Satisfies(predicate)
    }
}

impl From<&str> for Expected<str> {
    fn from(expected: &str) -> Self {
        Expected::Equals(expected.to_owned())
    }
}

impl From<String> for Expected<str> {
    fn from(expected: String) -> Self {
        Expected::Equals(expected)
    }
}

impl From<Severity> for Expected<Severity> {
    fn from(expected: Severity) -> Self {
        Expected::Equals(expected)
    }
}

impl From<SystemTime> for Expected<SystemTime> {
    fn from(expected: SystemTime) -> Self {
        Expected::Equals(expected)
    }
}

/// The object under test.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// An exported log record, together with its scope and resource.
    Log(&'a ExportedLog),
    /// A single attribute.
    Attribute {
        /// Attribute name
        key: &'a str,
        /// Attribute value
        value: &'a AnyValue,
    },
    /// A bare value, such as a record body.
    Value(&'a AnyValue),
}

impl<'a> Subject<'a> {
    /// Names the shape of this subject.
    pub fn shape(&self) -> &'static str {
        match self {
            Subject::Log(_) => "log record",
            Subject::Attribute { .. } => "attribute",
            Subject::Value(_) => "value",
        }
    }

    /// Returns the log, or [`MatchError::ActualTypeMismatch`] for any other
    /// shape.
    pub fn log(self) -> Result<&'a ExportedLog, MatchError> {
        match self {
            Subject::Log(log) => Ok(log),
            other => Err(MatchError::ActualTypeMismatch {
                expected: "log record",
                actual: other.shape(),
            }),
        }
    }
}

impl<'a> From<&'a ExportedLog> for Subject<'a> {
    fn from(log: &'a ExportedLog) -> Self {
        Subject::Log(log)
    }
}

impl<'a> From<&'a AnyValue> for Subject<'a> {
    fn from(value: &'a AnyValue) -> Self {
        Subject::Value(value)
    }
}

impl<'a> From<&'a (Key, AnyValue)> for Subject<'a> {
    fn from((key, value): &'a (Key, AnyValue)) -> Self {
        Subject::Attribute {
            key: key.as_str(),
            value,
        }
    }
}

/// A test on a [`Subject`].
pub trait Matcher: fmt::Debug + Send + Sync {
    /// Returns whether `actual` satisfies this matcher.
    ///
    /// An error means that the outcome could not be determined; it is never
    /// a plain "no match".
    fn matches(&self, actual: Subject<'_>) -> MatchResult;

    /// Returns the attribute predicate of matchers that test a single
    /// attribute, so that record matchers can resolve all of them together.
    fn attribute_predicate(&self) -> Option<AttributePredicate> {
        None
    }

    /// Message explaining why `actual` did not match.
    fn failure_message(&self, actual: Subject<'_>) -> String {
        format!("Expected\n{actual:#?}\nto match\n{self:#?}")
    }

    /// Message explaining why `actual` unexpectedly matched.
    fn negated_failure_message(&self, actual: Subject<'_>) -> String {
        format!("Expected\n{actual:#?}\nnot to match\n{self:#?}")
    }
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        (**self).matches(actual)
    }

    fn attribute_predicate(&self) -> Option<AttributePredicate> {
        (**self).attribute_predicate()
    }

    fn failure_message(&self, actual: Subject<'_>) -> String {
        (**self).failure_message(actual)
    }

    fn negated_failure_message(&self, actual: Subject<'_>) -> String {
        (**self).negated_failure_message(actual)
    }
}

/// Asserts that `actual` satisfies `matcher`.
///
/// # Panics
///
/// Panics with the matcher's failure message when `actual` does not match,
/// and with a distinct message when the match could not be evaluated.
#[track_caller]
pub fn assert_matches<'a, M: Matcher + ?Sized>(actual: impl Into<Subject<'a>>, matcher: &M) {
    let actual = actual.into();
    match matcher.matches(actual) {
        Ok(true) => {}
        Ok(false) => panic!("{}", matcher.failure_message(actual)),
        Err(err) => panic!("could not evaluate\n{matcher:#?}\nagainst\n{actual:#?}\n{err}"),
    }
}

/// Asserts that `actual` does not satisfy `matcher`.
///
/// # Panics
///
/// Panics with the matcher's negated failure message when `actual` matches,
/// and with a distinct message when the match could not be evaluated.
#[track_caller]
pub fn assert_not_matches<'a, M: Matcher + ?Sized>(actual: impl Into<Subject<'a>>, matcher: &M) {
    let actual = actual.into();
    match matcher.matches(actual) {
        Ok(false) => {}
        Ok(true) => panic!("{}", matcher.negated_failure_message(actual)),
        Err(err) => panic!("could not evaluate\n{matcher:#?}\nagainst\n{actual:#?}\n{err}"),
    }
}
