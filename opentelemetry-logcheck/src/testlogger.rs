use opentelemetry::logs::LoggerProvider;
use opentelemetry::{otel_debug, InstrumentationScope, KeyValue};
use opentelemetry_chanlog::{log_channel, ChannelExporter, LogReceiver};
use opentelemetry_sdk::logs::{LogExporter, SdkLogger, SdkLoggerProvider, SimpleLogProcessor};
use std::fmt;

/// Name of the instrumentation scope of [`TestLogger`]s.
pub const INSTRUMENTATION_SCOPE_NAME: &str = "opentelemetry-logcheck";

/// Name of the attribute every [`TestLogger`] adds to its instrumentation
/// scope.
pub const INSTRUMENTATION_ATTRIBUTE_NAME: &str = "opentelemetry-logcheck.testlogger";

/// Value of [`INSTRUMENTATION_ATTRIBUTE_NAME`].
pub const INSTRUMENTATION_ATTRIBUTE_VALUE: i64 = 42;

/// A throwaway logger whose records are delivered into a channel.
///
/// Records are exported synchronously as they are emitted, so the channel
/// capacity bounds how many records the code under test can emit before the
/// test has to receive some of them. Shutting the test logger down closes the
/// channel.
pub struct TestLogger {
    provider: SdkLoggerProvider,
    exporter: ChannelExporter,
    logger: SdkLogger,
    receiver: LogReceiver,
}

impl TestLogger {
    /// Creates a test logger buffering up to `capacity` records.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = log_channel(capacity);
        let exporter = ChannelExporter::builder()
            .with_channel(sender, receiver.clone())
            .build();
        let provider = SdkLoggerProvider::builder()
            .with_log_processor(SimpleLogProcessor::new(exporter.clone()))
            .build();
        let scope = InstrumentationScope::builder(INSTRUMENTATION_SCOPE_NAME)
            .with_attributes([KeyValue::new(
                INSTRUMENTATION_ATTRIBUTE_NAME,
                INSTRUMENTATION_ATTRIBUTE_VALUE,
            )])
            .build();
        let logger = provider.logger_with_scope(scope);
        TestLogger {
            provider,
            exporter,
            logger,
            receiver,
        }
    }

    /// The logger to hand to the code under test.
    pub fn logger(&self) -> &SdkLogger {
        &self.logger
    }

    /// The receiving end of the channel.
    pub fn receiver(&self) -> &LogReceiver {
        &self.receiver
    }

    /// Shuts the provider down and closes the channel. Records already in
    /// the channel can still be received.
    pub fn shutdown(&self) {
        if let Err(err) = self.provider.shutdown() {
            otel_debug!(
                name: "TestLogger.Shutdown.Failed",
                error = format!("{err}")
            );
        }
        // provider shutdown does not reach the exporter of a simple processor
        if let Err(err) = self.exporter.shutdown() {
            otel_debug!(
                name: "TestLogger.Shutdown.ExporterFailed",
                error = format!("{err}")
            );
        }
    }
}

impl fmt::Debug for TestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestLogger")
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}
