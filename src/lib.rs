//! A minimal intent → change → state reactive container.
//!
//! Callers submit intents; each intent expands into an ordered, possibly
//! delayed sequence of changes; every change is folded into an immutable
//! snapshot that is published to all observers. Processing is serialized per
//! container: the changes of one intent are all folded before the next intent
//! begins.
//!
//! ## Example
//!
//! ```rust
//! use futures::StreamExt;
//! use oxide_reactor::{Container, Expansion, ReactorLogic, SpawnedFuture};
//!
//! #[derive(Clone, Copy)]
//! enum Intent { Add(i32) }
//!
//! #[derive(Clone, Copy)]
//! enum Change { Busy(bool), Add(i32) }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Default)]
//! struct State { total: i32, busy: bool }
//!
//! struct Adder;
//!
//! impl ReactorLogic<Intent, Change, State> for Adder {
//!     fn expand(&self, intent: Intent) -> Expansion<Change> {
//!         match intent {
//!             Intent::Add(n) => Expansion::concat(vec![
//!                 Expansion::just(Change::Busy(true)),
//!                 Expansion::after(move || async move { Change::Add(n) }),
//!                 Expansion::just(Change::Busy(false)),
//!             ]),
//!         }
//!     }
//!
//!     fn fold(&self, state: &State, change: Change) -> State {
//!         match change {
//!             Change::Busy(busy) => State { busy, ..*state },
//!             Change::Add(n) => State { total: state.total + n, ..*state },
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // Create a spawner for your async runtime
//! let spawner = |fut: SpawnedFuture| {
//!     tokio::spawn(fut);
//! };
//!
//! let container = Container::new(State::default(), Adder, spawner);
//! let mut states = container.observe();
//! container.submit(Intent::Add(2));
//!
//! assert_eq!(states.next().await, Some(State { total: 0, busy: false }));
//! assert_eq!(states.next().await, Some(State { total: 0, busy: true }));
//! assert_eq!(states.next().await, Some(State { total: 2, busy: true }));
//! assert_eq!(states.next().await, Some(State { total: 2, busy: false }));
//! # }
//! ```

// Module declarations
mod container;
mod counter;
mod dispatcher;
mod error;
mod expansion;
mod logic;
mod observer;

// Public re-exports
pub use container::{Container, Phase, SpawnedFuture, Spawner};
pub use counter::{
    CounterChange, CounterIntent, CounterLogic, CounterState, Delay, PendingOperation,
    DEFAULT_DELAY,
};
pub use dispatcher::Dispatcher;
pub use error::ReactorError;
pub use expansion::Expansion;
pub use logic::ReactorLogic;
pub use observer::{DistinctUntilChanged, StateStream};

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use observer::TestObserver;
