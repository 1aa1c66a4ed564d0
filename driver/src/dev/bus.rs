//! The I2C bus: instantiates clients on one adapter and binds them to drivers.
//!
//! This is the enumeration side of the driver model. Clients appear either explicitly
//! ([I2cBus::new_device]) or by detection over a driver's address list when the driver is
//! registered; each new client is matched against the [DriverTable] by name and probed.
//! [I2cBus::delete_device] unbinds (calling [Driver::remove]) and drops the client.
use crate::dev::{
    attr::AttrError,
    client::I2cClient,
    driver::{Driver, DriverTable},
};
use core::fmt::{Display, Formatter};
use log::{debug, info};
use smbus::{Adapter, Functionality, SmbusError};
use spin::RwLock;
use std::sync::Arc;
use utils::handle::Handle;

#[derive(Clone)]
struct Binding {
    client: Handle<I2cClient>,
    driver: Option<Arc<dyn Driver>>,
}

pub struct I2cBus {
    adapter: Arc<dyn Adapter>,
    drivers: DriverTable,
    bindings: RwLock<Vec<Binding>>,
}

/// Whether `addr` is a 7-bit address a client may use (reserved ranges excluded).
pub fn is_valid_client_addr(addr: u16) -> bool {
    (0x08..=0x77).contains(&addr)
}

impl I2cBus {
    pub fn new(adapter: Arc<dyn Adapter>) -> I2cBus {
        I2cBus {
            adapter,
            drivers: DriverTable::new(),
            bindings: RwLock::new(vec![]),
        }
    }

    pub fn adapter_nr(&self) -> u32 {
        self.adapter.nr()
    }

    pub fn drivers(&self) -> &DriverTable {
        &self.drivers
    }

    /// Register `driver`, bind matching clients that are still unbound, then scan the
    /// driver's address list. Returns how many clients detection created.
    pub fn register_driver(&self, driver: Arc<dyn Driver>) -> usize {
        self.drivers.register(driver.clone());

        let unbound: Vec<Handle<I2cClient>> = self
            .bindings
            .read()
            .iter()
            .filter(|b| b.driver.is_none())
            .map(|b| b.client.clone())
            .collect();
        for client in unbound {
            self.bind(&client);
        }

        self.detect(&driver)
    }

    /// Instantiate a client called `name` at `addr` and try to bind it.
    ///
    /// The client is created even if no driver accepts it.
    pub fn new_device(&self, name: &str, addr: u16) -> Result<Handle<I2cClient>, BusError> {
        if !is_valid_client_addr(addr) {
            return Err(BusError::InvalidAddress(addr));
        }
        let device = self.adapter.open(addr).map_err(BusError::Adapter)?;
        let client = Handle::from(I2cClient::new(
            name,
            addr,
            self.adapter.nr(),
            self.adapter.functionality(),
            device,
        ));
        {
            let mut bindings = self.bindings.write();
            if bindings.iter().any(|b| b.client.addr() == addr) {
                return Err(BusError::AddressBusy(addr));
            }
            bindings.push(Binding {
                client: client.clone(),
                driver: None,
            });
        }
        info!(
            "i2c-{}: new device '{}' at {:#04x}",
            self.adapter.nr(),
            name,
            addr
        );
        self.bind(&client);
        Ok(client)
    }

    /// Unbind and drop the client at `addr`.
    pub fn delete_device(&self, addr: u16) -> Result<(), BusError> {
        let binding = {
            let mut bindings = self.bindings.write();
            let index = bindings
                .iter()
                .position(|b| b.client.addr() == addr)
                .ok_or(BusError::NoSuchDevice(addr))?;
            bindings.swap_remove(index)
        };
        if let Some(driver) = binding.driver {
            driver.remove(&binding.client);
        }
        info!(
            "i2c-{}: deleted device '{}' at {:#04x}",
            self.adapter.nr(),
            binding.client.name(),
            addr
        );
        Ok(())
    }

    /// Scan `driver`'s address list and instantiate a client, named after the driver's
    /// first id, wherever a device answers a Receive Byte.
    pub fn detect(&self, driver: &Arc<dyn Driver>) -> usize {
        let Some(id) = driver.get_id_table().first() else {
            return 0;
        };
        if !self
            .adapter
            .functionality()
            .contains(Functionality::SMBUS_READ_BYTE)
        {
            debug!("i2c-{}: cannot detect without Receive Byte", self.adapter.nr());
            return 0;
        }
        let mut count = 0;
        for &addr in driver.get_address_list() {
            if !is_valid_client_addr(addr) || self.client(addr).is_some() {
                continue;
            }
            let present = match self.adapter.open(addr) {
                Ok(mut dev) => dev.read_byte().is_ok(),
                Err(_) => false,
            };
            if !present {
                debug!("i2c-{}: nothing at {:#04x}", self.adapter.nr(), addr);
                continue;
            }
            if self.new_device(id.name, addr).is_ok() {
                count += 1;
            }
        }
        count
    }

    pub fn client(&self, addr: u16) -> Option<Handle<I2cClient>> {
        self.bindings
            .read()
            .iter()
            .find(|b| b.client.addr() == addr)
            .map(|b| b.client.clone())
    }

    pub fn clients(&self) -> Vec<Handle<I2cClient>> {
        self.bindings.read().iter().map(|b| b.client.clone()).collect()
    }

    /// Name of the driver bound to the client at `addr`, if any.
    pub fn bound_driver(&self, addr: u16) -> Option<&'static str> {
        self.bindings
            .read()
            .iter()
            .find(|b| b.client.addr() == addr)
            .and_then(|b| b.driver.as_ref().map(|d| d.get_name()))
    }

    /// Read attribute `name` of the client at `addr`.
    pub fn read_attribute(&self, addr: u16, name: &str) -> Result<String, BusError> {
        let client = self.client(addr).ok_or(BusError::NoSuchDevice(addr))?;
        client.show(name).map_err(BusError::Attr)
    }

    /// Try the candidate drivers for `client` until one accepts it.
    fn bind(&self, client: &Handle<I2cClient>) -> bool {
        for (driver, id) in self.drivers.find(client.name()) {
            match driver.probe(client, &id) {
                Ok(()) => {
                    let mut bindings = self.bindings.write();
                    let bound = match bindings.iter_mut().find(|b| b.client.ptr_eq(client)) {
                        Some(binding) => {
                            binding.driver = Some(driver.clone());
                            true
                        }
                        None => false,
                    };
                    drop(bindings);
                    if !bound {
                        // Deleted while probing; undo.
                        driver.remove(client);
                        return false;
                    }
                    dev_dbg!(client, "bound to driver '{}'", driver.get_name());
                    return true;
                }
                Err(err) => {
                    dev_warn!(
                        client,
                        "probe by '{}' failed: {} ({})",
                        driver.get_name(),
                        err,
                        crate::error::Errno::errno(&err)
                    );
                }
            }
        }
        false
    }
}

// region: Error Types

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Not a usable 7-bit client address.
    InvalidAddress(u16),
    /// A client already sits at this address.
    AddressBusy(u16),
    /// No client at this address.
    NoSuchDevice(u16),
    Attr(AttrError),
    Adapter(SmbusError),
}

impl crate::error::Errno for BusError {
    fn errno(&self) -> i32 {
        match self {
            BusError::InvalidAddress(_) => SmbusError::InvalidArgument.errno(),
            BusError::AddressBusy(_) => SmbusError::Busy.errno(),
            BusError::NoSuchDevice(_) => SmbusError::NoDevice.errno(),
            BusError::Attr(AttrError::PermissionDenied) => -13, // EACCES
            BusError::Attr(_) => -2,                            // ENOENT
            BusError::Adapter(err) => err.errno(),
        }
    }
}

impl Display for BusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BusError::InvalidAddress(addr) => write!(f, "invalid address {:#04x}", addr),
            BusError::AddressBusy(addr) => write!(f, "address {:#04x} already in use", addr),
            BusError::NoSuchDevice(addr) => write!(f, "no device at {:#04x}", addr),
            BusError::Attr(err) => write!(f, "{}", err),
            BusError::Adapter(err) => write!(f, "adapter: {}", err),
        }
    }
}

impl std::error::Error for BusError {}

// endregion
