//! I2C client driver for a QSFP control CPLD.
//!
//! The CPLD exposes 16-bit logical registers through a two-step SMBus protocol; this crate
//! binds to it on an [dev::bus::I2cBus], keeps a registry of bound devices and serves the
//! read-only `qsfp_lpmode` and `qsfp_reset` attributes.
//#![deny(missing_docs)]

#[macro_use]
pub mod logging;
pub mod cpld;
pub mod dev;
pub mod error;

pub use cpld::CpldDriver;
pub use dev::bus::I2cBus;
