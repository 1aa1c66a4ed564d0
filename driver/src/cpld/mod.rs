//! The QSFP control CPLD.
//!
//! The CPLD answers at one slave address and hides a file of byte registers behind a
//! single SMBus command, the high register `0x00`:
//! - read: Write Byte `index` to `0x00`, then Receive Byte;
//! - write: Write Word `value << 8 | index` to `0x00`.
//!
//! Reset and low-power-mode control for the QSFP cages each span two registers, which
//! the attributes combine into one 16-bit value.
use num_enum::{IntoPrimitive, TryFromPrimitive};

mod attrs;
mod driver;
mod regs;
mod registry;

pub use attrs::{ATTR_GROUP_NAME, QsfpAttr, QsfpAttribute, READ_ERROR, read_lpmode, read_reset};
pub use driver::CpldDriver;
pub use regs::{CpldData, encode_write};
pub use registry::ClientRegistry;

/// CPLD register map.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Register {
    Version = 0x00,
    /// QSFP reset control, one per IOM half
    QsfpResetCtrl0 = 0x10,
    QsfpResetCtrl1 = 0x11,
    /// QSFP low power mode
    QsfpLpMode0 = 0x12,
    QsfpLpMode1 = 0x13,
    /// QSFP module presence
    QsfpModPresent0 = 0x16,
    QsfpModPresent1 = 0x17,
}

/// Two registers read as one 16-bit value, `lo` supplying bits 0..8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub lo: Register,
    pub hi: Register,
}

impl RegisterPair {
    pub const RESET: RegisterPair = RegisterPair {
        lo: Register::QsfpResetCtrl0,
        hi: Register::QsfpResetCtrl1,
    };
    pub const LPMODE: RegisterPair = RegisterPair {
        lo: Register::QsfpLpMode0,
        hi: Register::QsfpLpMode1,
    };
    pub const MOD_PRESENT: RegisterPair = RegisterPair {
        lo: Register::QsfpModPresent0,
        hi: Register::QsfpModPresent1,
    };
}

/// What a bound device offers, chosen by the id it matched.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum CpldVariant {
    /// Registered and publishing `qsfp_lpmode` / `qsfp_reset`.
    Full = 0,
    /// Registered, no attributes.
    Bare = 1,
}
