//! An OpenTelemetry log exporter that sends log records into a bounded
//! channel.
//!
//! This exporter is intended for tests, it is not meant for production use.
//! Tests pick up the log records emitted by the code under test from the
//! channel, either concurrently or at certain check points, leveraging the
//! channel's buffering.
//!
//! # Example
//!
//! ```
//! use opentelemetry::logs::{LogRecord, Logger, LoggerProvider};
//! use opentelemetry_chanlog::{drain_blocking, Cancellation, ChannelExporter};
//! use opentelemetry_sdk::logs::{LogExporter, SdkLoggerProvider, SimpleLogProcessor};
//!
//! let exporter = ChannelExporter::builder().with_capacity(10).build();
//! let receiver = exporter.receiver().unwrap();
//! let provider = SdkLoggerProvider::builder()
//!     .with_log_processor(SimpleLogProcessor::new(exporter.clone()))
//!     .build();
//!
//! let logger = provider.logger("example");
//! for name in ["org.foo", "org.bar"] {
//!     let mut record = logger.create_log_record();
//!     record.set_event_name(name);
//!     logger.emit(record);
//! }
//! provider.shutdown().unwrap();
//! // A simple processor does not pass shutdown on to its exporter. Shutting
//! // the exporter down closes the channel, so draining ends after the
//! // buffered records.
//! exporter.shutdown().unwrap();
//!
//! let names: Vec<_> = drain_blocking(&receiver, &Cancellation::never())
//!     .filter_map(|log| log.record.event_name())
//!     .collect();
//! assert_eq!(names, ["org.foo", "org.bar"]);
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

mod cancellation;
mod drain;
mod error;
mod exporter;

pub use cancellation::{cancellation, CancelHandle, Cancellation};
pub use drain::{drain, drain_blocking};
pub use error::{ChannelError, ChannelResult};
pub use exporter::{
    log_channel, ChannelExporter, ChannelExporterBuilder, ExportedLog, LogReceiver, LogSender,
};
