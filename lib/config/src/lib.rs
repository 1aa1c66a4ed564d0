//! Configuration for the CPLD driver.
//! The values are generated at build time from `cpld.json` at the workspace root.

#![no_std]
#![deny(missing_docs)]

/// One entry of the device id table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdConfig {
    /// Device identifier matched against instantiated clients.
    pub name: &'static str,
    /// Whether the bound device exposes its attribute group.
    pub sysfs: bool,
}

#[allow(missing_docs)]
mod build_flags {
    use super::DeviceIdConfig;
    include!(concat!(env!("OUT_DIR"), "/build_flags.rs"));
}

pub use build_flags::*;
