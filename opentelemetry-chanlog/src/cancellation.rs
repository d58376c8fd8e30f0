//! A cloneable, one-shot cancellation signal.
//!
//! Writes into a full channel wait for room; a [`Cancellation`] lets the
//! waiting side give up instead of blocking forever.
use crate::error::{ChannelError, ChannelResult};
use futures_channel::oneshot;
use futures_util::future::{self, FutureExt, Shared};
use std::fmt;

/// Creates a new cancellation signal together with the handle that fires it.
///
/// Dropping the [`CancelHandle`] fires the signal as well.
///
/// # Example
///
/// ```
/// use opentelemetry_chanlog::cancellation;
///
/// let (handle, signal) = cancellation();
/// assert!(!signal.is_cancelled());
/// handle.cancel();
/// assert!(signal.is_cancelled());
/// ```
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (sender, receiver) = oneshot::channel();
    (
        CancelHandle { sender },
        Cancellation {
            signal: Some(receiver.shared()),
        },
    )
}

/// Fires the [`Cancellation`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    sender: oneshot::Sender<()>,
}

impl CancelHandle {
    /// Fires the signal. All clones of the paired [`Cancellation`] observe it.
    pub fn cancel(self) {
        // the receiving side may be gone already, which is fine.
        let _ = self.sender.send(());
    }
}

/// The observing side of a cancellation signal.
///
/// The default value never fires.
#[derive(Clone, Default)]
pub struct Cancellation {
    signal: Option<Shared<oneshot::Receiver<()>>>,
}

impl Cancellation {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Returns `true` once the signal has fired, without blocking.
    pub fn is_cancelled(&self) -> bool {
        match &self.signal {
            Some(signal) => signal.clone().now_or_never().is_some(),
            None => false,
        }
    }

    /// Resolves once the signal fires; never resolves for [`Cancellation::never`].
    pub async fn cancelled(&self) {
        match &self.signal {
            // an error means the handle was dropped, which counts as firing.
            Some(signal) => {
                let _ = signal.clone().await;
            }
            None => future::pending::<()>().await,
        }
    }

    /// Returns [`ChannelError::Cancelled`] if the signal has fired.
    pub fn check(&self) -> ChannelResult {
        if self.is_cancelled() {
            Err(ChannelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_executor::block_on;

    #[test]
    fn never_fires() {
        let signal = Cancellation::never();
        assert!(!signal.is_cancelled());
        assert_eq!(signal.check(), Ok(()));
        assert!(signal.cancelled().now_or_never().is_none());
    }

    #[test]
    fn fires_for_all_clones() {
        let (handle, signal) = cancellation();
        let other = signal.clone();
        assert!(!signal.is_cancelled());

        handle.cancel();
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
        assert_eq!(other.check(), Err(ChannelError::Cancelled));
        block_on(other.cancelled());
    }

    #[test]
    fn dropping_the_handle_fires() {
        let (handle, signal) = cancellation();
        drop(handle);
        assert!(signal.is_cancelled());
    }

    #[test]
    fn wakes_up_waiters() {
        let (handle, signal) = cancellation();
        let waiter = std::thread::spawn(move || block_on(signal.cancelled()));
        handle.cancel();
        waiter.join().expect("waiter thread panicked");
    }
}
