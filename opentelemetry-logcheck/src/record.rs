use crate::attribute::{AttributePredicate, ExpectedValue, ValueTest};
use crate::containment::contains;
use crate::error::{MatchError, MatchResult};
use crate::matcher::{Expected, Matcher, Subject};
use crate::scope::log_scopes;
use crate::value::{normalize, AttributeValue, Dynamic};
use opentelemetry::logs::Severity;
use opentelemetry_sdk::logs::SdkLogRecord;
use std::borrow::Borrow;
use std::fmt;
use std::time::SystemTime;

/// Matches log records satisfying all of the given matchers.
///
/// Matchers testing a single attribute are resolved together against the
/// resource, instrumentation scope and record attributes of the log, each
/// consuming a distinct attribute (see [`contains`]). All other matchers
/// are evaluated against the whole log first, in the given order, stopping
/// at the first that does not match.
///
/// Use [`be_a_record!`](crate::be_a_record) to build one from a list of
/// matchers.
#[derive(Debug)]
pub struct BeARecord {
    fields: Vec<Box<dyn Matcher>>,
    attributes: Vec<AttributePredicate>,
}

impl BeARecord {
    /// Creates a record matcher from field and attribute matchers.
    pub fn new(matchers: impl IntoIterator<Item = Box<dyn Matcher>>) -> Self {
        let mut fields = Vec::new();
        let mut attributes = Vec::new();
        for matcher in matchers {
            match matcher.attribute_predicate() {
                Some(predicate) => attributes.push(predicate),
                None => fields.push(matcher),
            }
        }
        BeARecord { fields, attributes }
    }
}

impl Matcher for BeARecord {
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        let log = actual.log()?;
        for field in &self.fields {
            if !field.matches(actual)? {
                return Ok(false);
            }
        }
        contains(&self.attributes, &log_scopes(log))
    }
}

/// Builds a [`BeARecord`] from matchers of any type.
///
/// # Example
///
/// ```
/// use opentelemetry::logs::Severity;
/// use opentelemetry_logcheck::{be_a_record, have_attribute, have_event_name, have_severity};
///
/// let matcher = be_a_record!(
///     have_event_name("org.foo"),
///     have_severity(Severity::Info),
///     have_attribute("http.method=GET"),
/// );
/// ```
#[macro_export]
macro_rules! be_a_record {
    ($($matcher:expr),+ $(,)?) => {
        $crate::BeARecord::new([$(
            ::std::boxed::Box::new($matcher) as ::std::boxed::Box<dyn $crate::Matcher>
        ),+])
    };
}

/// Matches one field of a log record against an [`Expected`] value.
///
/// A severity or timestamp missing from the record never matches.
pub struct FieldMatcher<T: ?Sized + ToOwned + 'static> {
    field: &'static str,
    extract: fn(&SdkLogRecord) -> Option<T::Owned>,
    expected: Expected<T>,
}

impl<T> fmt::Debug for FieldMatcher<T>
where
    T: ?Sized + ToOwned + 'static,
    T::Owned: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("field", &self.field)
            .field("expected", &self.expected)
            .finish()
    }
}

impl<T> Matcher for FieldMatcher<T>
where
    T: ?Sized + ToOwned + PartialEq + 'static,
    T::Owned: fmt::Debug + Send + Sync,
{
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        let log = actual.log()?;
        match (self.extract)(&log.record) {
            Some(value) => self.expected.test(Borrow::<T>::borrow(&value)),
            None => Ok(false),
        }
    }

    fn failure_message(&self, actual: Subject<'_>) -> String {
        let found = actual
            .log()
            .ok()
            .and_then(|log| (self.extract)(&log.record));
        format!(
            "Expected {} to match\n{:#?}\nfound\n{:#?}",
            self.field, self.expected, found
        )
    }
}

// missing names and texts compare as empty strings
fn event_name(record: &SdkLogRecord) -> Option<String> {
    Some(record.event_name().unwrap_or_default().to_owned())
}

fn severity_text(record: &SdkLogRecord) -> Option<String> {
    Some(record.severity_text().unwrap_or_default().to_owned())
}

fn severity(record: &SdkLogRecord) -> Option<Severity> {
    record.severity_number()
}

fn timestamp(record: &SdkLogRecord) -> Option<SystemTime> {
    record.timestamp()
}

fn observed_timestamp(record: &SdkLogRecord) -> Option<SystemTime> {
    record.observed_timestamp()
}

/// Matches records with the given event name.
pub fn have_event_name(expected: impl Into<Expected<str>>) -> FieldMatcher<str> {
    FieldMatcher {
        field: "event name",
        extract: event_name,
        expected: expected.into(),
    }
}

/// Matches records with the given severity number.
pub fn have_severity(expected: impl Into<Expected<Severity>>) -> FieldMatcher<Severity> {
    FieldMatcher {
        field: "severity",
        extract: severity,
        expected: expected.into(),
    }
}

/// Matches records with the given severity text.
pub fn have_severity_text(expected: impl Into<Expected<str>>) -> FieldMatcher<str> {
    FieldMatcher {
        field: "severity text",
        extract: severity_text,
        expected: expected.into(),
    }
}

/// Matches records with the given timestamp.
pub fn have_timestamp(expected: impl Into<Expected<SystemTime>>) -> FieldMatcher<SystemTime> {
    FieldMatcher {
        field: "timestamp",
        extract: timestamp,
        expected: expected.into(),
    }
}

/// Matches records with the given observed timestamp.
pub fn have_observed_timestamp(
    expected: impl Into<Expected<SystemTime>>,
) -> FieldMatcher<SystemTime> {
    FieldMatcher {
        field: "observed timestamp",
        extract: observed_timestamp,
        expected: expected.into(),
    }
}

/// Matches records whose body satisfies a value test. A record without a
/// body has an empty body.
#[derive(Debug, Clone)]
pub struct HaveBody {
    expected: ValueTest,
}

/// Matches records by body, see [`AttributePredicate::with_value`] for how
/// `expected` is interpreted.
pub fn have_body(expected: impl Into<ExpectedValue>) -> Result<HaveBody, MatchError> {
    Ok(HaveBody {
        expected: ValueTest::new(expected.into())?,
    })
}

impl Matcher for HaveBody {
    fn matches(&self, actual: Subject<'_>) -> MatchResult {
        let log = actual.log()?;
        let body = match log.record.body() {
            Some(body) => normalize(Dynamic::from(body))?,
            None => AttributeValue::Empty,
        };
        self.expected.test(&body)
    }
}
