//! Draining a log record channel.
use crate::cancellation::Cancellation;
use async_channel::Receiver;
use futures_util::stream::{Stream, StreamExt};

/// Returns a stream of the items received from `receiver`, ending when the
/// channel is closed and empty, or when `cancellation` fires.
///
/// The cancellation is checked before each item, so an already fired signal
/// yields nothing, even if items are still buffered.
pub fn drain<'a, T: 'a>(
    receiver: &Receiver<T>,
    cancellation: &'a Cancellation,
) -> impl Stream<Item = T> + 'a {
    receiver.clone().take_until(cancellation.cancelled())
}

/// Blocking version of [`drain`].
pub fn drain_blocking<'a, T: 'a>(
    receiver: &Receiver<T>,
    cancellation: &'a Cancellation,
) -> impl Iterator<Item = T> + 'a {
    futures_executor::block_on_stream(Box::pin(drain(receiver, cancellation)))
}
