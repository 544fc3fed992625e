//! Reactor logic trait defining the intent → change → state contract.

use crate::Expansion;

/// Reactor logic trait defining the intent → change → state contract.
///
/// Implementations provide two functions:
/// - [`expand`](Self::expand): Turn an intent into an ordered, possibly delayed sequence of changes
/// - [`fold`](Self::fold): Reduce (State, Change) → State
///
/// The [`Container`](crate::Container) drives both on a single serialized loop: every change
/// produced for one intent is folded and published before the next intent
/// is expanded.
///
/// See the [crate-level documentation](crate) for a complete example.
pub trait ReactorLogic<Intent, Change, State> {
    /// Expand an intent into the changes it causes.
    ///
    /// The returned [`Expansion`] is lazy: each change is folded as soon as
    /// it is produced. Expansion must be deterministic, i.e. the same intent
    /// always yields the same ordered changes.
    ///
    /// # Arguments
    ///
    /// * `intent` - The intent submitted by a caller
    ///
    /// # Returns
    ///
    /// The ordered sequence of changes for this intent.
    fn expand(&self, intent: Intent) -> Expansion<Change>;

    /// Fold a change into the current state, producing the next snapshot.
    ///
    /// This must be a pure function of its two arguments. All state
    /// transitions happen here.
    ///
    /// # Arguments
    ///
    /// * `state` - The current snapshot
    /// * `change` - The change to apply
    ///
    /// # Returns
    ///
    /// The new snapshot that replaces `state`.
    fn fold(&self, state: &State, change: Change) -> State;
}

impl<Intent, Change, State, L> ReactorLogic<Intent, Change, State> for Box<L>
where
    L: ReactorLogic<Intent, Change, State> + ?Sized,
{
    fn expand(&self, intent: Intent) -> Expansion<Change> {
        (**self).expand(intent)
    }

    fn fold(&self, state: &State, change: Change) -> State {
        (**self).fold(state, change)
    }
}
