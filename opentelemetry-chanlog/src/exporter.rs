use crate::cancellation::Cancellation;
use crate::error::ChannelResult;
use async_channel::{Receiver, Sender};
use futures_util::future::{self, Either};
use futures_util::pin_mut;
use opentelemetry::{otel_debug, InstrumentationScope};
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::logs::{LogBatch, LogExporter, SdkLogRecord};
use opentelemetry_sdk::Resource;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Capacity of the exporter's channel.
pub(crate) const OTEL_CHANLOG_CAPACITY: &str = "OTEL_CHANLOG_CAPACITY";
/// Default capacity of the exporter's channel.
pub(crate) const OTEL_CHANLOG_CAPACITY_DEFAULT: usize = 1;

/// Sending side of a log record channel.
pub type LogSender = Sender<ExportedLog>;
/// Receiving side of a log record channel.
pub type LogReceiver = Receiver<ExportedLog>;

/// Creates a bounded log record channel suitable for
/// [`ChannelExporterBuilder::with_channel`]. The capacity is at least one.
pub fn log_channel(capacity: usize) -> (LogSender, LogReceiver) {
    async_channel::bounded(capacity.max(1))
}

/// `ExportedLog` associates an exported [`SdkLogRecord`] with the
/// [`InstrumentationScope`] of its logger and the [`Resource`] of its provider.
#[derive(Clone, Debug)]
pub struct ExportedLog {
    /// Log record
    pub record: SdkLogRecord,
    /// Instrumentation details for the logger that emitted this record.
    pub instrumentation: InstrumentationScope,
    /// Resource of the provider that emitted this record.
    pub resource: Resource,
}

/// A log exporter that sends every exported record into a bounded channel.
///
/// This exporter is meant for tests: the code under test logs through a
/// provider using this exporter, while the test picks up the records from
/// [`ChannelExporter::receiver`], either concurrently or at check points,
/// relying on the channel's buffering.
///
/// Exports block while the channel is full, until either a receiver makes
/// room or the configured [`Cancellation`] fires.
///
/// # Example
///
/// ```
/// use opentelemetry::logs::{LogRecord, Logger, LoggerProvider};
/// use opentelemetry_chanlog::ChannelExporter;
/// use opentelemetry_sdk::logs::{SdkLoggerProvider, SimpleLogProcessor};
///
/// let exporter = ChannelExporter::builder().with_capacity(10).build();
/// // grab the receiver now: it is gone once the exporter has shut down.
/// let receiver = exporter.receiver().unwrap();
///
/// let provider = SdkLoggerProvider::builder()
///     .with_log_processor(SimpleLogProcessor::new(exporter))
///     .build();
/// let logger = provider.logger("example");
/// let mut record = logger.create_log_record();
/// record.set_body("DO'H!".into());
/// logger.emit(record);
///
/// let log = receiver.try_recv().unwrap();
/// assert_eq!(log.record.body(), Some(&"DO'H!".into()));
/// ```
#[derive(Clone, Debug)]
pub struct ChannelExporter {
    sender: LogSender,
    receiver: LogReceiver,
    cancellation: Cancellation,
    resource: Resource,
}

impl Default for ChannelExporter {
    fn default() -> Self {
        ChannelExporterBuilder::default().build()
    }
}

impl ChannelExporter {
    /// Returns a builder configured from the environment.
    pub fn builder() -> ChannelExporterBuilder {
        ChannelExporterBuilder::default()
    }

    /// Returns the receiving side of the channel, or `None` once the exporter
    /// has been shut down.
    ///
    /// A receiver obtained before shutdown keeps working: it yields the
    /// records still buffered and then reports the channel as closed.
    pub fn receiver(&self) -> Option<LogReceiver> {
        if self.sender.is_closed() {
            None
        } else {
            Some(self.receiver.clone())
        }
    }

    /// Returns the capacity of the channel.
    pub fn capacity(&self) -> usize {
        // bounded channels always report their capacity.
        self.sender.capacity().unwrap_or(1)
    }

    /// Returns `true` once the exporter has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.sender.is_closed()
    }

    /// Sends a single log into the channel, waiting for room while the
    /// channel is full.
    ///
    /// Gives up with [`ChannelError::Cancelled`](crate::ChannelError::Cancelled)
    /// when `cancellation` fires before the log could be placed. After
    /// shutdown the log is dropped: the call then succeeds, unless
    /// `cancellation` has already fired.
    pub async fn send(&self, log: ExportedLog, cancellation: &Cancellation) -> ChannelResult {
        if self.sender.is_closed() {
            otel_debug!(
                name: "ChannelExporter.ExportAfterShutdown",
                message = "Log record dropped, the exporter has been shut down."
            );
            return cancellation.check();
        }

        let send = self.sender.send(log);
        let cancelled = cancellation.cancelled();
        pin_mut!(send, cancelled);
        match future::select(send, cancelled).await {
            Either::Left((Ok(()), _)) => Ok(()),
            // shut down while waiting for room.
            Either::Left((Err(_), _)) => cancellation.check(),
            Either::Right(((), _)) => {
                otel_debug!(
                    name: "ChannelExporter.Send.Cancelled",
                    message = "Gave up waiting for room in the log record channel."
                );
                Err(crate::ChannelError::Cancelled)
            }
        }
    }

    fn close(&self) {
        if self.sender.close() {
            otel_debug!(
                name: "ChannelExporter.Shutdown",
                buffered_records = self.receiver.len()
            );
        } else {
            otel_debug!(
                name: "ChannelExporter.Shutdown.AlreadyShutdown",
                message = "Shutdown is being invoked more than once. This is noop."
            );
        }
    }
}

impl LogExporter for ChannelExporter {
    #[allow(clippy::manual_async_fn)]
    fn export(
        &self,
        batch: LogBatch<'_>,
    ) -> impl std::future::Future<Output = OTelSdkResult> + Send {
        let logs: Vec<ExportedLog> = batch
            .iter()
            .map(|(record, instrumentation)| ExportedLog {
                record: record.clone(),
                instrumentation: instrumentation.clone(),
                resource: self.resource.clone(),
            })
            .collect();
        async move {
            for log in logs {
                self.send(log, &self.cancellation)
                    .await
                    .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))?;
            }
            self.cancellation
                .check()
                .map_err(|err| OTelSdkError::InternalFailure(err.to_string()))
        }
    }

    fn shutdown_with_timeout(&self, _timeout: Duration) -> OTelSdkResult {
        self.close();
        Ok(())
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.clone();
    }
}

/// Builder for [`ChannelExporter`].
#[derive(Debug)]
pub struct ChannelExporterBuilder {
    capacity: usize,
    channel: Option<(LogSender, LogReceiver)>,
    cancellation: Cancellation,
}

impl Default for ChannelExporterBuilder {
    /// Creates a builder initialized with the default capacity, overridden by
    /// the environment variable `OTEL_CHANLOG_CAPACITY` if set.
    ///
    /// Note: Programmatic configuration overrides the environment variable.
    fn default() -> Self {
        ChannelExporterBuilder {
            capacity: OTEL_CHANLOG_CAPACITY_DEFAULT,
            channel: None,
            cancellation: Cancellation::never(),
        }
        .init_from_env_vars()
    }
}

impl ChannelExporterBuilder {
    /// Sets the capacity of the channel the exporter creates. Capacities
    /// below one are raised to one.
    ///
    /// Corresponding environment variable: `OTEL_CHANLOG_CAPACITY`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Uses a caller-created channel instead of creating one. The capacity
    /// setting is ignored in this case.
    pub fn with_channel(mut self, sender: LogSender, receiver: LogReceiver) -> Self {
        self.channel = Some((sender, receiver));
        self
    }

    /// Sets the cancellation signal that exports observe while waiting for
    /// room in the channel. By default exports wait indefinitely.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Builds the exporter.
    pub fn build(self) -> ChannelExporter {
        let (sender, receiver) = self
            .channel
            .unwrap_or_else(|| log_channel(self.capacity));
        ChannelExporter {
            sender,
            receiver,
            cancellation: self.cancellation,
            resource: Resource::builder_empty().build(),
        }
    }

    fn init_from_env_vars(mut self) -> Self {
        if let Some(capacity) = env::var(OTEL_CHANLOG_CAPACITY)
            .ok()
            .and_then(|capacity| usize::from_str(&capacity).ok())
        {
            self.capacity = capacity.max(1);
        }
        self
    }
}
