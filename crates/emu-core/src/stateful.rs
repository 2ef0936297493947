//! Component lifecycle: reset and save states.

/// A component with resettable, capturable state.
///
/// `snapshot` must capture everything `restore` needs to bring a component
/// back to an identical observable state. Restoring never changes
/// configuration (which board variant, which ROMs); only mutable state.
pub trait Stateful {
    /// Captured state.
    type State;

    /// Return to the power-on / reset state.
    fn reset(&mut self);

    /// Capture the current state.
    fn snapshot(&self) -> Self::State;

    /// Replace the current state with a captured one.
    fn restore(&mut self, state: &Self::State);
}
