use crate::dev::attr::{AttrError, AttrMode, Attribute, AttributeGroup};
use core::fmt::{Debug, Formatter};
use smbus::{Functionality, SmbusDevice};
use spin::{Mutex, MutexGuard, RwLock};

/// An instantiated I2C device: one slave address on one adapter.
///
/// The SMBus device sits behind a per-client lock. Drivers hold it across every transfer
/// sequence that must not interleave with another caller on the same client; clients never
/// share a lock, so traffic to different devices runs in parallel.
pub struct I2cClient {
    name: Box<str>,
    addr: u16,
    adapter_nr: u32,
    func: Functionality,
    bus: Mutex<Box<dyn SmbusDevice>>,
    groups: RwLock<Vec<AttributeGroup>>,
}

impl I2cClient {
    pub fn new(
        name: &str,
        addr: u16,
        adapter_nr: u32,
        func: Functionality,
        device: Box<dyn SmbusDevice>,
    ) -> I2cClient {
        I2cClient {
            name: Box::from(name),
            addr,
            adapter_nr,
            func,
            bus: Mutex::new(device),
            groups: RwLock::new(vec![]),
        }
    }

    /// Device id this client was instantiated with.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> u16 {
        self.addr
    }

    pub fn adapter_nr(&self) -> u32 {
        self.adapter_nr
    }

    /// Kernel-style device name, `<adapter>-<addr>`.
    pub fn dev_name(&self) -> String {
        format!("{}-{:04x}", self.adapter_nr, self.addr)
    }

    pub fn functionality(&self) -> Functionality {
        self.func
    }

    /// Whether the adapter supports everything in `func`.
    pub fn check_functionality(&self, func: Functionality) -> bool {
        self.func.contains(func)
    }

    /// Take the client's bus lock.
    pub fn lock_bus(&self) -> MutexGuard<'_, Box<dyn SmbusDevice>> {
        self.bus.lock()
    }

    /// Publish `group`. Fails without publishing anything if a name is taken.
    pub fn create_group(&self, group: AttributeGroup) -> Result<(), AttrError> {
        let mut groups = self.groups.write();
        for name in group.attr_names() {
            if groups.iter().any(|g| g.find(name).is_some()) {
                return Err(AttrError::Exists(name));
            }
        }
        groups.push(group);
        Ok(())
    }

    pub fn remove_group(&self, name: &str) -> Option<AttributeGroup> {
        let mut groups = self.groups.write();
        let index = groups.iter().position(|g| g.name() == name)?;
        Some(groups.remove(index))
    }

    pub fn attr_names(&self) -> Vec<&'static str> {
        let groups = self.groups.read();
        groups.iter().flat_map(|g| g.attr_names()).collect()
    }

    /// Read the attribute `attr`.
    pub fn show(&self, attr: &str) -> Result<String, AttrError> {
        let groups = self.groups.read();
        let attr = groups
            .iter()
            .find_map(|g| g.find(attr))
            .ok_or(AttrError::NotFound)?;
        if attr.mode().intersects(AttrMode::S_IRUGO) {
            Ok(attr.show())
        } else {
            Err(AttrError::PermissionDenied)
        }
    }
}

impl Debug for I2cClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("I2cClient")
            .field("name", &self.name)
            .field("addr", &format_args!("{:#04x}", self.addr))
            .field("adapter_nr", &self.adapter_nr)
            .finish()
    }
}
