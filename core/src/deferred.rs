//! Pending asynchronous display-text resolution.

use fieldcore_types::FieldError;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Generation counter paired with the one outstanding deferred format.
///
/// Every display-text write bumps the generation. A deferred result is only
/// applied while its generation is still current, so a synchronous update
/// made after the deferred format was issued always wins.
#[derive(Debug, Default)]
pub(crate) struct DeferredFormat {
    generation: u64,
    pending: Option<PendingFormat>,
}

#[derive(Debug)]
struct PendingFormat {
    generation: u64,
    receiver: oneshot::Receiver<Result<String, FieldError>>,
}

/// What polling the pending format yielded.
#[derive(Debug)]
pub(crate) enum Resolution {
    Text(String),
    Failed(Option<FieldError>),
}

impl DeferredFormat {
    #[must_use]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// A synchronous write happened. Anything still pending is stale.
    pub(crate) fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    pub(crate) fn issue(&mut self, receiver: oneshot::Receiver<Result<String, FieldError>>) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(PendingFormat {
            generation: self.generation,
            receiver,
        });
    }

    /// Poll without blocking. `None` while unresolved or when nothing is pending.
    pub(crate) fn poll(&mut self) -> Option<Resolution> {
        let pending = self.pending.as_mut()?;
        let resolution = match pending.receiver.try_recv() {
            Err(TryRecvError::Empty) => return None,
            Ok(Ok(text)) => Resolution::Text(text),
            Ok(Err(error)) => Resolution::Failed(Some(error)),
            Err(TryRecvError::Closed) => Resolution::Failed(None),
        };
        let current = pending.generation == self.generation;
        self.pending = None;
        current.then_some(resolution)
    }
}
