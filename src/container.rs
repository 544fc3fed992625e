//! The reactor container that owns the current state and runs the processing loop.

use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;

use flume::{Receiver, Sender};
use futures::future::{AbortHandle, Abortable};
use futures::StreamExt;
use portable_atomic_util::Arc;
use spin::Mutex;

use crate::dispatcher::Gate;
use crate::{Dispatcher, ReactorLogic, StateStream};

/// A future handed to a [`Spawner`].
pub type SpawnedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A spawner trait for executing futures on an async runtime.
///
/// This abstraction allows you to use whatever concurrency model you want (tokio, async-std, embassy, etc.).
///
/// Function pointers and closures automatically implement this trait via the blanket implementation.
pub trait Spawner {
    /// Spawn a future on the async runtime.
    fn spawn(&self, future: SpawnedFuture);
}

impl<F> Spawner for F
where
    F: Fn(SpawnedFuture),
{
    fn spawn(&self, future: SpawnedFuture) {
        self(future)
    }
}

/// Processing phase of a container.
///
/// A container is `Processing` from the moment an intent is accepted until
/// its queue is empty and the last intent's expansion is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next intent.
    Idle,
    /// An intent is queued or its changes are being folded.
    Processing,
}

struct Slot<State> {
    current: State,
    phase: Phase,
    observers: Vec<(u64, Sender<State>)>,
    next_observer: u64,
    closed: bool,
}

/// Current-state slot shared between the container, its loop and its observers.
///
/// Only the processing loop writes `current`; everyone else clones it out.
pub(crate) struct Shared<State> {
    slot: Mutex<Slot<State>>,
}

impl<State: Send + 'static> Shared<State> {
    pub(crate) fn unsubscribe(&self, id: u64) {
        let mut slot = self.slot.lock();
        let before = slot.observers.len();
        slot.observers.retain(|(observer, _)| *observer != id);
        if slot.observers.len() != before {
            tracing::debug!(observer = id, "observer unsubscribed");
        }
    }
}

impl<State: Clone + Send + 'static> Shared<State> {
    fn new(initial_state: State) -> Self {
        Self {
            slot: Mutex::new(Slot {
                current: initial_state,
                phase: Phase::Idle,
                observers: Vec::new(),
                next_observer: 0,
                closed: false,
            }),
        }
    }

    fn current(&self) -> State {
        self.slot.lock().current.clone()
    }

    /// Install `next` and send it to every live observer.
    ///
    /// Returns `false` once the container has been closed; nothing is installed then.
    fn publish(&self, next: State) -> bool {
        let mut slot = self.slot.lock();
        if slot.closed {
            return false;
        }
        slot.current = next;
        let Slot {
            current, observers, ..
        } = &mut *slot;
        observers.retain(|(_, sender)| sender.send(current.clone()).is_ok());
        tracing::trace!(observers = observers.len(), "snapshot published");
        true
    }

    fn set_phase(&self, phase: Phase) {
        let mut slot = self.slot.lock();
        if !slot.closed {
            slot.phase = phase;
        }
    }

    fn subscribe(this: &Arc<Self>) -> StateStream<State> {
        let (sender, receiver) = flume::unbounded();
        let mut slot = this.slot.lock();
        let id = slot.next_observer;
        slot.next_observer += 1;
        // Seeded under the lock so no fold can slip between the seed and registration.
        if !slot.closed && sender.send(slot.current.clone()).is_ok() {
            slot.observers.push((id, sender));
            tracing::debug!(observer = id, "observer subscribed");
        }
        drop(slot);
        StateStream::new(id, receiver.into_stream().boxed(), this.clone())
    }

    fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        slot.phase = Phase::Idle;
        slot.observers.clear();
    }
}

/// The reactor container that owns the current state and serializes all transitions.
///
/// This is the core of the crate. It:
/// 1. Accepts intents through a [`Dispatcher`] (fire-and-forget, never blocking)
/// 2. Expands each intent into changes via [`ReactorLogic::expand`]
/// 3. Folds every change into the current state via [`ReactorLogic::fold`]
/// 4. Publishes each resulting snapshot to every [`StateStream`]
///
/// All processing happens on one loop spawned through the [`Spawner`] at
/// construction. The changes of one intent are fully folded before the next
/// intent is expanded, so intents never interleave, while observers still see
/// the intermediate snapshots of the intent in progress.
///
/// Dropping the container cancels any pending asynchronous step, stops
/// publication and ends every observer stream.
///
/// See the [crate-level documentation](crate) for a complete example.
///
/// # Type Parameters
///
/// * `Intent` - The intent type accepted by the container
/// * `Change` - The change type produced by expansion
/// * `State` - The snapshot type
/// * `Logic` - The logic implementation type (implements [`ReactorLogic`])
pub struct Container<Intent, Change, State, Logic>
where
    Intent: Send + 'static,
    State: Clone + Send + 'static,
    Logic: ReactorLogic<Intent, Change, State>,
{
    dispatcher: Dispatcher<Intent>,
    shared: Arc<Shared<State>>,
    gate: Arc<Gate>,
    abort: AbortHandle,
    _logic: PhantomData<fn() -> (Change, Logic)>,
}

impl<Intent, Change, State, Logic> Container<Intent, Change, State, Logic>
where
    Intent: Send + 'static,
    Change: Send + 'static,
    State: Clone + Send + 'static,
    Logic: ReactorLogic<Intent, Change, State> + Send + 'static,
{
    /// Create a container and start its processing loop.
    ///
    /// # Arguments
    ///
    /// * `initial_state` - The snapshot exposed before any intent is processed
    /// * `logic` - Reactor logic implementing [`ReactorLogic`]
    /// * `spawner` - Spawner that runs the processing loop on your chosen runtime
    pub fn new<Spawn: Spawner>(initial_state: State, logic: Logic, spawner: Spawn) -> Self {
        let (intent_sender, intent_receiver) = flume::unbounded();
        let gate = Arc::new(Gate::new());
        let shared = Arc::new(Shared::new(initial_state));

        let (abort, registration) = AbortHandle::new_pair();
        let processing = Abortable::new(
            process(logic, intent_receiver, shared.clone(), gate.clone()),
            registration,
        );
        spawner.spawn(Box::pin(async move {
            if processing.await.is_err() {
                tracing::debug!("processing loop cancelled");
            }
        }));

        Container {
            dispatcher: Dispatcher::new(intent_sender, gate.clone()),
            shared,
            gate,
            abort,
            _logic: PhantomData,
        }
    }
}

impl<Intent, Change, State, Logic> Container<Intent, Change, State, Logic>
where
    Intent: Send + 'static,
    State: Clone + Send + 'static,
    Logic: ReactorLogic<Intent, Change, State>,
{
    /// A cloneable handle for submitting intents.
    pub fn dispatcher(&self) -> Dispatcher<Intent> {
        self.dispatcher.clone()
    }

    /// Submit an intent, fire-and-forget.
    pub fn submit(&self, intent: Intent) {
        self.dispatcher.submit(intent);
    }

    /// The latest folded snapshot.
    pub fn current_state(&self) -> State {
        self.shared.current()
    }

    /// Subscribe to snapshots, starting with the current one.
    ///
    /// After teardown the returned stream yields nothing.
    pub fn observe(&self) -> StateStream<State> {
        Shared::subscribe(&self.shared)
    }

    /// Whether an intent is queued or in progress. A closed container is always `Idle`.
    pub fn phase(&self) -> Phase {
        let folding = self.shared.slot.lock().phase;
        if self.gate.is_closed() {
            Phase::Idle
        } else if folding == Phase::Processing || self.gate.pending() > 0 {
            Phase::Processing
        } else {
            Phase::Idle
        }
    }

    /// Intents submitted but not yet started.
    pub fn pending_intents(&self) -> usize {
        self.gate.pending()
    }

    /// Number of live [`StateStream`]s.
    pub fn observer_count(&self) -> usize {
        self.shared.slot.lock().observers.len()
    }

    /// Whether [`close`](Self::close) has run, explicitly or on drop.
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Tear the container down.
    ///
    /// Cancels the processing loop together with any pending asynchronous
    /// step, rejects further intents and ends every observer stream.
    /// Snapshots already delivered stay delivered. Calling this more than
    /// once has no further effect.
    pub fn close(&self) {
        if !self.gate.close() {
            return;
        }
        self.shared.close();
        self.abort.abort();
        tracing::info!(dropped_intents = self.gate.pending(), "reactor container closed");
    }
}

impl<Intent, Change, State, Logic> Drop for Container<Intent, Change, State, Logic>
where
    Intent: Send + 'static,
    State: Clone + Send + 'static,
    Logic: ReactorLogic<Intent, Change, State>,
{
    fn drop(&mut self) {
        self.close();
    }
}

async fn process<Intent, Change, State, Logic>(
    logic: Logic,
    intents: Receiver<Intent>,
    shared: Arc<Shared<State>>,
    gate: Arc<Gate>,
) where
    Change: Send + 'static,
    State: Clone + Send + 'static,
    Logic: ReactorLogic<Intent, Change, State>,
{
    while let Ok(intent) = intents.recv_async().await {
        shared.set_phase(Phase::Processing);
        gate.taken();
        tracing::debug!(queued = gate.pending(), "intent started");

        let mut changes = logic.expand(intent).into_stream();
        while let Some(change) = changes.next().await {
            let next = logic.fold(&shared.current(), change);
            if !shared.publish(next) {
                return;
            }
        }

        shared.set_phase(Phase::Idle);
        tracing::debug!("intent finished");
    }
}
