//! Driver subsystem: registration, id lookup and the probe contract.
//!
//! Responsibilities:
//! - Provide the [Driver] trait for I2C client drivers.
//! - Keep a [DriverTable] that maps device id strings to the drivers declaring them, so a
//!   freshly instantiated client finds its driver with one map lookup.
//!
//! Ownership and concurrency notes:
//! - The table is an ordinary value owned by the bus; several buses (and several tables)
//!   can coexist, which is what the tests rely on.
//! - The id map is protected by an [RwLock]; lookups clone the candidate list out so no
//!   lock is held while probing.
use crate::dev::client::I2cClient;
use core::fmt::{Debug, Display, Formatter};
use smbus::{Functionality, SmbusError};
use spin::RwLock;
use std::collections::btree_map::BTreeMap;
use std::sync::Arc;
use utils::{handle::Handle, vec::LockedVec};

/// An entry of a driver's id table.
///
/// `driver_data` is opaque to the bus and handed back to the driver on probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    pub name: &'static str,
    pub driver_data: usize,
}

/// Trait implemented by client drivers.
///
/// Guarantees and expectations:
/// - [Driver::probe] is called once per client whose name matches an id of the driver. On error the
///   client stays instantiated but unbound.
/// - [Driver::remove] is called exactly once for every client `probe` accepted, before the client is
///   dropped by the bus.
pub trait Driver: Send + Sync + Debug {
    fn get_name(&self) -> &'static str;
    fn get_id_table(&self) -> &[DeviceId];
    /// Addresses to scan when the driver is registered.
    fn get_address_list(&self) -> &[u16] {
        &[]
    }
    fn probe(&self, client: &Handle<I2cClient>, id: &DeviceId) -> Result<(), DriverProbeError>;
    fn remove(&self, client: &Handle<I2cClient>);
    fn on_registered(&self) {}
}

/// Drivers known to a bus, indexed by device id.
#[derive(Default)]
pub struct DriverTable {
    drivers: LockedVec<Arc<dyn Driver>>,
    id_map: RwLock<BTreeMap<&'static str, Vec<(Arc<dyn Driver>, DeviceId)>>>,
}

impl DriverTable {
    pub fn new() -> DriverTable {
        DriverTable::default()
    }

    /// Register a driver instance.
    ///
    /// Steps:
    /// 1. Log registration and invoke [Driver::on_registered].
    /// 2. Keep the instance in the table.
    /// 3. Insert it into the id map under each id it declares.
    pub fn register(&self, driver: Arc<dyn Driver>) {
        debug_ex!("Registered driver '{}'.", driver.get_name());
        driver.on_registered();
        self.drivers.push(driver.clone());

        let mut guard = self.id_map.write();
        for id in driver.get_id_table() {
            guard
                .entry(id.name)
                .or_default()
                .push((driver.clone(), *id));
        }
    }

    /// Look up drivers matching the device id `name`.
    ///
    /// Return an owned list of candidates with the id entry that matched; empty if none.
    pub fn find(&self, name: &str) -> Vec<(Arc<dyn Driver>, DeviceId)> {
        let guard = self.id_map.read();
        match guard.get(name) {
            Some(drv) => drv.clone(),
            None => vec![],
        }
    }

    pub fn drivers(&self) -> Vec<Arc<dyn Driver>> {
        self.drivers.snapshot()
    }
}

impl Debug for DriverTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("DriverTable{:?}", self.drivers))
    }
}

// region: Error Types

/// Errors that may be returned by [Driver::probe].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverProbeError {
    /// The adapter lacks transfer types the driver needs.
    Functionality { missing: Functionality },
    /// The matched id carries driver data the driver does not understand.
    UnknownVariant(usize),
    /// Talking to the device failed during probe.
    Bus(SmbusError),
    /// Custom driver-specific information.
    Customized { info: &'static str },
}

impl crate::error::Errno for DriverProbeError {
    fn errno(&self) -> i32 {
        match self {
            DriverProbeError::Functionality { .. } => SmbusError::Io.errno(),
            DriverProbeError::UnknownVariant(_) => SmbusError::InvalidArgument.errno(),
            DriverProbeError::Bus(err) => err.errno(),
            DriverProbeError::Customized { .. } => SmbusError::NoDevice.errno(),
        }
    }
}

impl Display for DriverProbeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            DriverProbeError::Functionality { missing } => {
                write!(f, "adapter lacks functionality {:#010x}", missing.bits())
            }
            DriverProbeError::UnknownVariant(data) => write!(f, "unknown device variant {}", data),
            DriverProbeError::Bus(err) => write!(f, "{}", err),
            DriverProbeError::Customized { info } => f.write_str(info),
        }
    }
}

// endregion
