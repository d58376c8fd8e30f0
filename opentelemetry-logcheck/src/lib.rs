//! Matchers for asserting on OpenTelemetry log records in tests.
//!
//! Log records are picked up from an
//! [`opentelemetry_chanlog::ChannelExporter`], typically through a
//! [`TestLogger`], and checked with [`Matcher`]s:
//!
//! - field matchers like [`have_event_name`] or [`have_severity`] test a
//!   single field of the record,
//! - [`have_attribute`] and friends test for an attribute, looked up in the
//!   resource, the instrumentation scope and the record itself,
//! - [`be_a_record!`] combines any number of those.
//!
//! A record matcher resolves all of its attribute matchers together, so
//! that each of them is satisfied by a different attribute: two
//! `have_attribute("foo")` require two `foo` attributes.
//!
//! # Example
//!
//! ```
//! use opentelemetry::logs::{LogRecord, Logger, Severity};
//! use opentelemetry_logcheck::{
//!     assert_matches, be_a_record, have_attribute, have_attribute_with_value, have_event_name,
//!     have_severity, TestLogger, INSTRUMENTATION_ATTRIBUTE_NAME,
//!     INSTRUMENTATION_ATTRIBUTE_VALUE,
//! };
//!
//! let test_logger = TestLogger::new(1);
//! let logger = test_logger.logger();
//! let mut record = logger.create_log_record();
//! record.set_event_name("org.foo");
//! record.set_severity_number(Severity::Info);
//! record.add_attribute("http.method", "GET");
//! logger.emit(record);
//!
//! let log = test_logger.receiver().try_recv().unwrap();
//! assert_matches(
//!     &log,
//!     &be_a_record!(
//!         have_event_name("org.foo"),
//!         have_severity(Severity::Info),
//!         have_attribute("http.method=GET"),
//!         have_attribute_with_value(
//!             INSTRUMENTATION_ATTRIBUTE_NAME,
//!             INSTRUMENTATION_ATTRIBUTE_VALUE,
//!         )
//!         .unwrap(),
//!     ),
//! );
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod attribute;
mod containment;
mod error;
mod matcher;
mod record;
mod scope;
mod testlogger;
mod value;

pub use attribute::{
    equals_value, have_attribute, have_attribute_named, have_attribute_satisfying,
    have_attribute_with_value, AttributePredicate, EqualsValue, ExpectedValue, HaveAttribute,
    ValueTest,
};
pub use containment::contains;
pub use error::{MatchError, MatchResult};
pub use matcher::{assert_matches, assert_not_matches, Expected, Matcher, Predicate, Subject};
pub use record::{
    have_body, have_event_name, have_observed_timestamp, have_severity, have_severity_text,
    have_timestamp, BeARecord, FieldMatcher, HaveBody,
};
pub use scope::{log_scopes, AttributeScope, LogScope};
pub use testlogger::{
    TestLogger, INSTRUMENTATION_ATTRIBUTE_NAME, INSTRUMENTATION_ATTRIBUTE_VALUE,
    INSTRUMENTATION_SCOPE_NAME,
};
pub use value::{normalize, AttributeValue, Dynamic};

pub use opentelemetry_chanlog::ExportedLog;
