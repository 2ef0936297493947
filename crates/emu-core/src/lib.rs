//! Core traits and types shared by the arcade board drivers.
//!
//! A driver owns board state and exposes it to host CPU cores through
//! [`Bus`] views. Timing is expressed in CPU cycles derived from each
//! processor's own clock; boards with more than one processor interleave
//! them in fixed slices measured by [`SliceClock`].

mod bus;
mod clock;
mod cpu;
mod observable;
mod stateful;
mod ticks;

pub use bus::Bus;
pub use clock::{MasterClock, SliceClock};
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
pub use stateful::Stateful;
pub use ticks::Ticks;
