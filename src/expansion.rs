//! Lazy, ordered sequences of changes produced from a single intent.

use core::future::Future;

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};

/// Ordered description of the changes caused by one intent.
///
/// An expansion is returned from [`ReactorLogic::expand`](crate::ReactorLogic::expand)
/// and consumed by the container one change at a time. Each change is folded
/// as soon as it becomes available, so intermediate snapshots (such as a busy
/// flag being raised) are published before later, delayed changes.
///
/// Expansions are finite and can only be driven once.
///
/// # Example
///
/// ```rust
/// use oxide_reactor::Expansion;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Change { Busy(bool), Loaded(u32) }
///
/// let expansion = Expansion::concat(vec![
///     Expansion::just(Change::Busy(true)),
///     Expansion::after(|| async { Change::Loaded(42) }),
///     Expansion::just(Change::Busy(false)),
/// ]);
///
/// let changes = futures::executor::block_on(expansion.collect());
/// assert_eq!(changes, vec![Change::Busy(true), Change::Loaded(42), Change::Busy(false)]);
/// ```
pub struct Expansion<Change>(BoxStream<'static, Change>);

impl<Change: Send + 'static> Expansion<Change> {
    /// Create an expansion that produces no changes.
    pub fn none() -> Self {
        Self(stream::empty().boxed())
    }

    /// Create an expansion producing a single, immediately available change.
    pub fn just(change: Change) -> Self {
        Self(stream::once(future::ready(change)).boxed())
    }

    /// Create an expansion whose single change is resolved by an async step.
    ///
    /// `step` is not called until the container reaches this point of the
    /// sequence, so any timer or I/O it starts begins only after every
    /// earlier change has been folded.
    pub fn after<F, Fut>(step: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Change> + Send + 'static,
    {
        Self(stream::once(async move { step().await }).boxed())
    }

    /// Chain expansions strictly one after the other.
    ///
    /// No change from a later part is produced before the earlier part is exhausted.
    pub fn concat(parts: Vec<Expansion<Change>>) -> Self {
        Self(stream::iter(parts).flat_map(|part| part.0).boxed())
    }

    /// Wrap an arbitrary finite stream of changes.
    pub fn from_stream<S>(changes: S) -> Self
    where
        S: Stream<Item = Change> + Send + 'static,
    {
        Self(changes.boxed())
    }

    /// Hand the underlying stream to the engine.
    pub fn into_stream(self) -> BoxStream<'static, Change> {
        self.0
    }

    /// Drive the expansion to completion, collecting every change.
    pub async fn collect(self) -> Vec<Change> {
        self.0.collect().await
    }
}

impl<Change: Send + 'static> Default for Expansion<Change> {
    fn default() -> Self {
        Self::none()
    }
}
