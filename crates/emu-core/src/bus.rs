//! Memory-mapped bus interface.

/// Memory-mapped bus as seen by one processor.
///
/// The bus decodes the address and routes the access to the handler bound
/// to that range. Reads may have side effects (latches, counters), so they
/// take `&mut self`.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address. Unmapped writes are dropped.
    fn write(&mut self, address: u16, value: u8);
}
