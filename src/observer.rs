//! Snapshot observation: multicast state streams and observer-side filters.

use core::pin::Pin;
use core::task::{Context, Poll};

use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use portable_atomic_util::Arc;

#[cfg(any(test, feature = "testing"))]
use spin::Mutex;

use crate::container::Shared;
#[cfg(any(test, feature = "testing"))]
use crate::Spawner;

/// Stream of state snapshots returned by [`Container::observe`](crate::Container::observe).
///
/// The first item is the snapshot that was current when the stream was
/// created, followed by one item per fold step. Every stream receives the
/// full sequence independently of other observers.
///
/// The stream ends when the container is torn down. Dropping the stream
/// unregisters it from the container immediately.
///
/// # Example
///
/// ```rust
/// use futures::StreamExt;
/// use oxide_reactor::{Container, CounterLogic, CounterState, SpawnedFuture};
///
/// let container = Container::new(CounterState::default(), CounterLogic::default(), |_fut: SpawnedFuture| {});
/// let mut states = container.observe();
///
/// let first = futures::executor::block_on(states.next());
/// assert_eq!(first, Some(CounterState { value: 0, is_loading: false }));
/// ```
pub struct StateStream<State: Send + 'static> {
    id: u64,
    snapshots: BoxStream<'static, State>,
    shared: Arc<Shared<State>>,
}

impl<State: Clone + Send + 'static> StateStream<State> {
    pub(crate) fn new(id: u64, snapshots: BoxStream<'static, State>, shared: Arc<Shared<State>>) -> Self {
        Self {
            id,
            snapshots,
            shared,
        }
    }

    /// Release this subscription explicitly.
    ///
    /// Equivalent to dropping the stream.
    pub fn unsubscribe(self) {}

    /// Project every snapshot and suppress consecutive duplicate projections.
    ///
    /// This is how a binding interested in a single field (a label's text,
    /// a spinner's animating flag) avoids redundant updates; the container
    /// itself publishes every fold result.
    pub fn distinct_by<P, F>(self, mut projection: F) -> impl Stream<Item = P> + Send + 'static
    where
        P: Clone + PartialEq + Send + 'static,
        F: FnMut(&State) -> P + Send + 'static,
    {
        let mut filter = DistinctUntilChanged::new();
        self.filter_map(move |state| future::ready(filter.accept(projection(&state))))
    }
}

impl<State: Send + 'static> Stream for StateStream<State> {
    type Item = State;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<State>> {
        self.snapshots.poll_next_unpin(cx)
    }
}

impl<State: Send + 'static> Drop for StateStream<State> {
    fn drop(&mut self) {
        self.shared.unsubscribe(self.id);
    }
}

/// Equality-guarded filter passing a value only when it differs from the last one passed.
///
/// # Example
///
/// ```rust
/// use oxide_reactor::DistinctUntilChanged;
///
/// let mut filter = DistinctUntilChanged::new();
/// assert_eq!(filter.accept(1), Some(1));
/// assert_eq!(filter.accept(1), None);
/// assert_eq!(filter.accept(2), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct DistinctUntilChanged<T> {
    last: Option<T>,
}

impl<T> Default for DistinctUntilChanged<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: Clone + PartialEq> DistinctUntilChanged<T> {
    /// A filter that has not passed any value yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(value)` if it differs from the previously accepted value.
    pub fn accept(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test observer that records every snapshot it receives.
///
/// Only available with the `testing` feature.
///
/// Attach it to a container's [`StateStream`]; the recorder drains the
/// stream on the given spawner, so snapshots become visible once the
/// spawned task has run.
///
/// # Example
///
/// ```rust,no_run
/// use oxide_reactor::{Container, CounterLogic, CounterState, SpawnedFuture, TestObserver};
///
/// # async fn demo() {
/// let spawner = |fut: SpawnedFuture| { tokio::spawn(fut); };
/// let container = Container::new(CounterState::default(), CounterLogic::default(), spawner);
///
/// let observer = TestObserver::new();
/// observer.attach(container.observe(), &spawner);
///
/// tokio::task::yield_now().await;
/// observer.with_snapshots(|snapshots| {
///     assert_eq!(snapshots[0], CounterState::default());
/// });
/// # }
/// ```
pub struct TestObserver<State> {
    snapshots: Arc<Mutex<Vec<State>>>,
}

#[cfg(any(test, feature = "testing"))]
impl<State> Clone for TestObserver<State> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl<State: Clone + Send + 'static> Default for TestObserver<State> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<State: Clone + Send + 'static> TestObserver<State> {
    /// An observer with no recorded snapshots.
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain `stream` into this observer on `spawner`.
    pub fn attach<S: Spawner>(&self, mut stream: StateStream<State>, spawner: &S) {
        let snapshots = self.snapshots.clone();
        spawner.spawn(Box::pin(async move {
            while let Some(state) = stream.next().await {
                snapshots.lock().push(state);
            }
        }));
    }

    /// Get the number of snapshots received so far.
    pub fn count(&self) -> usize {
        self.snapshots.lock().len()
    }

    /// The most recently received snapshot.
    pub fn last(&self) -> Option<State> {
        self.snapshots.lock().last().cloned()
    }

    /// Access the recorded snapshots with a closure.
    pub fn with_snapshots<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<State>) -> R,
    {
        let snapshots = self.snapshots.lock();
        f(&snapshots)
    }
}
