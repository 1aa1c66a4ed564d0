//! Error types for register access, and the errno mapping shared by all driver errors.

use core::fmt::{Debug, Display, Formatter};
use smbus::SmbusError;

/// An error that can be reported as a kernel-style negative status.
pub trait Errno: Debug {
    fn errno(&self) -> i32;
}

/// Register access failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpldError {
    /// A bus transfer failed; this is the first one that did.
    Bus(SmbusError),
    /// The client behind the record is gone.
    NoDevice,
}

impl From<SmbusError> for CpldError {
    fn from(value: SmbusError) -> Self {
        CpldError::Bus(value)
    }
}

impl Errno for CpldError {
    fn errno(&self) -> i32 {
        match self {
            CpldError::Bus(err) => err.errno(),
            CpldError::NoDevice => SmbusError::NoDevice.errno(),
        }
    }
}

impl Display for CpldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CpldError::Bus(err) => write!(f, "bus transfer failed: {}", err),
            CpldError::NoDevice => write!(f, "device detached"),
        }
    }
}

impl std::error::Error for CpldError {}
