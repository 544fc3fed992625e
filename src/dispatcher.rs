//! Intent dispatcher handed to UI bindings and other producers.

use core::str::FromStr;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use flume::Sender;
use portable_atomic_util::Arc;

use crate::ReactorError;

/// Admission state shared by every dispatcher clone, the container and its loop.
pub(crate) struct Gate {
    closed: AtomicBool,
    pending: AtomicUsize,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns `true` if this call closed the gate.
    pub(crate) fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Intents accepted but not yet taken by the loop.
    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Called by the loop once it has taken an intent off the queue.
    pub(crate) fn taken(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Cloneable handle for submitting intents to a [`Container`](crate::Container).
///
/// `Dispatcher` wraps an unbounded channel sender, so submission never blocks
/// and any number of producers may hold a clone. Intents from one producer are
/// processed in the order they were submitted.
///
/// # Example
///
/// ```rust
/// # use oxide_reactor::{Container, CounterIntent, CounterLogic, CounterState, SpawnedFuture};
/// # let spawner = |_fut: SpawnedFuture| {};
/// let container = Container::new(CounterState::default(), CounterLogic::default(), spawner);
///
/// let dispatcher = container.dispatcher();
/// let on_plus_tap = move || dispatcher.submit(CounterIntent::Increment);
/// on_plus_tap();
/// ```
pub struct Dispatcher<Intent: Send> {
    sender: Sender<Intent>,
    gate: Arc<Gate>,
}

impl<Intent: Send> Clone for Dispatcher<Intent> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<Intent: Send> Dispatcher<Intent> {
    pub(crate) fn new(sender: Sender<Intent>, gate: Arc<Gate>) -> Self {
        Self { sender, gate }
    }

    /// Submit an intent, fire-and-forget.
    ///
    /// After the container is torn down the intent is dropped.
    pub fn submit(&self, intent: Intent) {
        if self.try_submit(intent).is_err() {
            tracing::debug!("intent dropped: container closed");
        }
    }

    /// Submit an intent, reporting [`ReactorError::Closed`] after teardown.
    ///
    /// The queue is owned by the processing loop alone, so once the loop is
    /// torn down the send itself fails.
    pub fn try_submit(&self, intent: Intent) -> Result<(), ReactorError> {
        if self.is_closed() {
            return Err(ReactorError::Closed);
        }
        // Counted before sending so the loop never takes an uncounted intent.
        self.gate.pending.fetch_add(1, Ordering::AcqRel);
        self.sender.send(intent).map_err(|_| {
            self.gate.taken();
            ReactorError::Closed
        })
    }

    /// Parse a string-tagged intent and submit it.
    ///
    /// Unknown tags are reported as [`ReactorError::UnrecognizedIntent`] and
    /// nothing is enqueued.
    pub fn submit_tagged(&self, tag: &str) -> Result<(), ReactorError>
    where
        Intent: FromStr<Err = ReactorError>,
    {
        let intent = tag.parse::<Intent>().inspect_err(|err| {
            tracing::warn!(%err, "rejected intent");
        })?;
        self.try_submit(intent)
    }

    /// Whether the owning container has been torn down.
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}
