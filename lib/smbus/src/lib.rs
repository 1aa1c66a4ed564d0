//! SMBus client interface.
//!
//! The traits here are the seam between a client driver and whatever moves bytes on the
//! wire. Transfers follow the SMBus command set (`read_byte`, `write_byte_data`, ...),
//! and adapters advertise what they support through [Functionality].
#![cfg_attr(not(test), no_std)]
extern crate alloc;

mod error;
mod func;
pub mod sim;

use alloc::boxed::Box;

pub use error::SmbusError;
pub use func::Functionality;

/// One device on an SMBus segment, already bound to its slave address.
pub trait SmbusDevice: Send {
    /// Receive Byte: read one byte without a command code.
    fn read_byte(&mut self) -> Result<u8, SmbusError>;
    /// Send Byte: write one byte without a command code.
    fn write_byte(&mut self, value: u8) -> Result<(), SmbusError>;
    /// Read Byte: read one byte from `command`.
    fn read_byte_data(&mut self, command: u8) -> Result<u8, SmbusError>;
    /// Write Byte: write `value` to `command`.
    fn write_byte_data(&mut self, command: u8, value: u8) -> Result<(), SmbusError>;
    /// Read Word: little-endian 16 bits from `command`.
    fn read_word_data(&mut self, command: u8) -> Result<u16, SmbusError>;
    /// Write Word: `value` goes out low byte first.
    fn write_word_data(&mut self, command: u8, value: u16) -> Result<(), SmbusError>;
}

/// A bus master able to reach devices by address.
pub trait Adapter: Send + Sync {
    /// Adapter number, used in device names.
    fn nr(&self) -> u32;
    fn functionality(&self) -> Functionality;
    /// Open the device at `addr`.
    ///
    /// Opening does not touch the wire; a missing device shows up on the first transfer.
    fn open(&self, addr: u16) -> Result<Box<dyn SmbusDevice>, SmbusError>;
}
