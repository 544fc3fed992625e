//! The two-button counter reactor.
//!
//! Each tap raises a busy flag, waits on a pending operation (a one second
//! delay by default), applies the delta and lowers the flag again.

use core::future::Future;
use core::str::FromStr;
use core::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use portable_atomic_util::Arc;

use crate::{Expansion, ReactorError, ReactorLogic};

/// Pacing delay used by [`CounterLogic::default`].
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// A tap on one of the two counter buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterIntent {
    Increment,
    Decrement,
}

impl FromStr for CounterIntent {
    type Err = ReactorError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "increment" | "plus" | "+" => Ok(Self::Increment),
            "decrement" | "minus" | "-" => Ok(Self::Decrement),
            _ => Err(ReactorError::UnrecognizedIntent {
                tag: tag.to_string(),
            }),
        }
    }
}

/// An already-decided delta folded into [`CounterState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterChange {
    ApplyIncrement,
    ApplyDecrement,
    SetBusy(bool),
}

/// Counter snapshot; the default is `{ value: 0, is_loading: false }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterState {
    pub value: i64,
    pub is_loading: bool,
}

/// The asynchronous step performed between raising the busy flag and applying a delta.
///
/// Closures returning a future implement this trait, so tests and callers
/// can substitute real work for the default [`Delay`].
pub trait PendingOperation: Send + Sync + 'static {
    /// Start the step; the delta is applied once the returned future resolves.
    fn run(&self) -> BoxFuture<'static, ()>;
}

impl<F, Fut> PendingOperation for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn run(&self) -> BoxFuture<'static, ()> {
        self().boxed()
    }
}

/// Fixed timer delay. Requires a tokio runtime with the time driver enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay(pub Duration);

impl PendingOperation for Delay {
    fn run(&self) -> BoxFuture<'static, ()> {
        tokio::time::sleep(self.0).boxed()
    }
}

/// Counter logic: busy-flagged, delayed increments and decrements.
///
/// # Example
///
/// ```rust
/// use oxide_reactor::{CounterChange, CounterLogic, CounterState, ReactorLogic};
///
/// let logic = CounterLogic::default();
/// let state = logic.fold(&CounterState::default(), CounterChange::ApplyIncrement);
/// assert_eq!(state, CounterState { value: 1, is_loading: false });
/// ```
pub struct CounterLogic<P: PendingOperation = Delay> {
    pending: Arc<P>,
}

impl<P: PendingOperation> Clone for CounterLogic<P> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
        }
    }
}

impl Default for CounterLogic<Delay> {
    fn default() -> Self {
        Self::with_delay(DEFAULT_DELAY)
    }
}

impl CounterLogic<Delay> {
    /// Counter logic pacing each delta with a fixed timer delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self::new(Delay(delay))
    }
}

impl<P: PendingOperation> CounterLogic<P> {
    /// Counter logic running `pending` before each delta.
    pub fn new(pending: P) -> Self {
        Self {
            pending: Arc::new(pending),
        }
    }

    fn paced(&self, change: CounterChange) -> Expansion<CounterChange> {
        let pending = self.pending.clone();
        Expansion::concat(vec![
            Expansion::just(CounterChange::SetBusy(true)),
            Expansion::after(move || async move {
                pending.run().await;
                change
            }),
            Expansion::just(CounterChange::SetBusy(false)),
        ])
    }
}

impl<P: PendingOperation> ReactorLogic<CounterIntent, CounterChange, CounterState>
    for CounterLogic<P>
{
    fn expand(&self, intent: CounterIntent) -> Expansion<CounterChange> {
        match intent {
            CounterIntent::Increment => self.paced(CounterChange::ApplyIncrement),
            CounterIntent::Decrement => self.paced(CounterChange::ApplyDecrement),
        }
    }

    fn fold(&self, state: &CounterState, change: CounterChange) -> CounterState {
        match change {
            CounterChange::ApplyIncrement => CounterState {
                value: state.value.wrapping_add(1),
                ..*state
            },
            CounterChange::ApplyDecrement => CounterState {
                value: state.value.wrapping_sub(1),
                ..*state
            },
            CounterChange::SetBusy(is_loading) => CounterState {
                is_loading,
                ..*state
            },
        }
    }
}
