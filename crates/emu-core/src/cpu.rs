//! CPU core trait.

use crate::Bus;

/// A CPU core supplied by the host.
///
/// Drivers never implement this; they drive it. The core borrows the
/// processor's bus view for each cycle so that a board can hand the same
/// state to two processors in turn.
pub trait Cpu {
    /// Advance the CPU by one clock cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    ///
    /// Returns `u32` so that 16-bit and wider cores share one signature.
    fn pc(&self) -> u32;

    /// Request a held interrupt: the line stays asserted until the core
    /// acknowledges it. Returns true if accepted.
    fn interrupt(&mut self) -> bool;

    /// Drive the maskable interrupt line to a level.
    ///
    /// Used by boards where the interrupt source is level-sensitive and is
    /// cleared by an explicit acknowledge write.
    fn set_irq_line(&mut self, asserted: bool);

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
