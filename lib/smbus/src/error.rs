use core::fmt::{Display, Formatter};
use num_enum::{FromPrimitive, IntoPrimitive};

/// Transfer failures, carried as the negative errno the kernel would return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum SmbusError {
    Io = -5,                // EIO
    NoDeviceOrAddress = -6, // ENXIO, no ACK from the slave
    Again = -11,            // EAGAIN, arbitration lost
    NoMemory = -12,         // ENOMEM
    Busy = -16,             // EBUSY
    NoDevice = -19,         // ENODEV
    InvalidArgument = -22,  // EINVAL
    NotSupported = -95,     // EOPNOTSUPP
    Timeout = -110,         // ETIMEDOUT
    #[default]
    Unknown = i32::MIN,
}

impl SmbusError {
    /// The negative errno for this error.
    pub fn errno(self) -> i32 {
        self.into()
    }

    /// Map a negative status back to an error; non-negative values are not errors.
    pub fn from_status(status: i32) -> Option<SmbusError> {
        if status >= 0 {
            None
        } else {
            Some(SmbusError::from_primitive(status))
        }
    }
}

impl Display for SmbusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            SmbusError::Io => "I/O error",
            SmbusError::NoDeviceOrAddress => "no such device or address",
            SmbusError::Again => "bus arbitration lost",
            SmbusError::NoMemory => "out of memory",
            SmbusError::Busy => "device or resource busy",
            SmbusError::NoDevice => "no such device",
            SmbusError::InvalidArgument => "invalid argument",
            SmbusError::NotSupported => "operation not supported",
            SmbusError::Timeout => "transfer timed out",
            SmbusError::Unknown => "unknown error",
        };
        write!(f, "{} ({})", msg, self.errno())
    }
}
