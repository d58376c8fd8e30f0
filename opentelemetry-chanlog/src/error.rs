//! Errors reported by the channel transport.
use thiserror::Error;

/// Errors returned when handing log records to the channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelError {
    /// The cancellation signal fired while waiting for room in the channel,
    /// or it had already fired when the write was attempted.
    #[error("export cancelled")]
    Cancelled,
}

/// Result of a single channel write.
pub type ChannelResult = Result<(), ChannelError>;
