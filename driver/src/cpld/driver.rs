use crate::{
    cpld::{ATTR_GROUP_NAME, ClientRegistry, CpldData, CpldVariant, QsfpAttribute},
    dev::{
        client::I2cClient,
        driver::{DeviceId, Driver, DriverProbeError},
    },
};
use smbus::Functionality;
use std::sync::Arc;
use utils::handle::Handle;

/// Transfers the register protocol uses: Write Byte to select, Receive Byte to read,
/// Write Word to store.
const REQUIRED_FUNC: Functionality = Functionality::from_bits_truncate(
    Functionality::SMBUS_BYTE_DATA.bits()
        | Functionality::SMBUS_READ_BYTE.bits()
        | Functionality::SMBUS_WRITE_WORD_DATA.bits(),
);

/// The CPLD client driver. Owns the registry of the devices it is bound to.
#[derive(Debug)]
pub struct CpldDriver {
    ids: Vec<DeviceId>,
    addresses: Vec<u16>,
    registry: ClientRegistry,
}

impl CpldDriver {
    /// Driver with the id table and address list from `cpld.json`.
    pub fn new() -> CpldDriver {
        let ids = config::DEVICE_IDS
            .iter()
            .map(|id| {
                let variant = if id.sysfs {
                    CpldVariant::Full
                } else {
                    CpldVariant::Bare
                };
                DeviceId {
                    name: id.name,
                    driver_data: variant.into(),
                }
            })
            .collect();
        CpldDriver::with_ids(ids, config::ADDRESS_LIST.to_vec())
    }

    pub fn with_ids(ids: Vec<DeviceId>, addresses: Vec<u16>) -> CpldDriver {
        CpldDriver {
            ids,
            addresses,
            registry: ClientRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// The record of a bound client.
    pub fn device(&self, client: &Handle<I2cClient>) -> Option<Arc<CpldData>> {
        self.registry.find(client)
    }
}

impl Default for CpldDriver {
    fn default() -> Self {
        CpldDriver::new()
    }
}

impl Driver for CpldDriver {
    fn get_name(&self) -> &'static str {
        config::DRIVER_NAME
    }

    fn get_id_table(&self) -> &[DeviceId] {
        &self.ids
    }

    fn get_address_list(&self) -> &[u16] {
        &self.addresses
    }

    fn probe(&self, client: &Handle<I2cClient>, id: &DeviceId) -> Result<(), DriverProbeError> {
        if !client.check_functionality(REQUIRED_FUNC) {
            dev_dbg!(client, "i2c_check_functionality failed ({:#x})", client.addr());
            return Err(DriverProbeError::Functionality {
                missing: REQUIRED_FUNC - client.functionality(),
            });
        }
        let variant = CpldVariant::try_from(id.driver_data)
            .map_err(|_| DriverProbeError::UnknownVariant(id.driver_data))?;

        dev_info!(client, "chip probed - adding to client store");
        let Some(data) = self.registry.attach(client, variant) else {
            return Ok(());
        };

        if variant == CpldVariant::Full {
            if let Err(err) = client.create_group(QsfpAttribute::group(&data)) {
                dev_info!(client, "Cannot create attributes: {}", err);
            }
        }
        Ok(())
    }

    fn remove(&self, client: &Handle<I2cClient>) {
        client.remove_group(ATTR_GROUP_NAME);
        self.registry.detach(client);
    }

    fn on_registered(&self) {
        debug_ex!(
            "{}: {} id(s), {} detect address(es)",
            config::DRIVER_NAME,
            self.ids.len(),
            self.addresses.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::bus::I2cBus;
    use smbus::sim::{SimAdapter, SimCpld};

    const IDS: &[DeviceId] = &[
        DeviceId {
            name: "plat_i2c_cpld",
            driver_data: 0,
        },
        DeviceId {
            name: "plat_i2c_cpld_bare",
            driver_data: 1,
        },
        DeviceId {
            name: "plat_i2c_cpld_bogus",
            driver_data: 9,
        },
    ];

    fn setup(func: Functionality) -> (Arc<SimAdapter>, I2cBus, Arc<CpldDriver>) {
        let adapter = Arc::new(SimAdapter::new(0, func));
        let bus = I2cBus::new(adapter.clone());
        let driver = Arc::new(CpldDriver::with_ids(IDS.to_vec(), vec![]));
        bus.register_driver(driver.clone());
        (adapter, bus, driver)
    }

    #[test]
    fn id_table_comes_from_config() {
        let driver = CpldDriver::new();
        assert_eq!(driver.get_name(), "i2c_cpld");
        assert_eq!(
            driver.get_id_table(),
            &[DeviceId {
                name: "plat_i2c_cpld",
                driver_data: 0
            }]
        );
        assert_eq!(driver.get_address_list(), &[0x3e]);
    }

    #[test]
    fn full_variant_publishes_attributes() {
        let (adapter, bus, driver) = setup(Functionality::SMBUS_EMUL);
        let sim = SimCpld::new(0x00);
        sim.set_register(0x12, 0x00);
        sim.set_register(0x13, 0x03);
        adapter.plug(0x3e, sim);

        let client = bus.new_device("plat_i2c_cpld", 0x3e).unwrap();
        assert!(driver.registry().contains(&client));
        assert_eq!(
            bus.read_attribute(0x3e, "qsfp_lpmode").unwrap(),
            "0x0300\n"
        );
        assert_eq!(
            driver.device(&client).unwrap().variant(),
            CpldVariant::Full
        );
    }

    #[test]
    fn bare_variant_registers_without_attributes() {
        let (adapter, bus, driver) = setup(Functionality::SMBUS_EMUL);
        adapter.plug(0x3e, SimCpld::new(0x00));
        let client = bus.new_device("plat_i2c_cpld_bare", 0x3e).unwrap();
        assert!(driver.registry().contains(&client));
        assert!(client.attr_names().is_empty());
    }

    #[test]
    fn unknown_variant_is_refused() {
        let (_, bus, driver) = setup(Functionality::SMBUS_EMUL);
        bus.new_device("plat_i2c_cpld_bogus", 0x3e).unwrap();
        assert_eq!(bus.bound_driver(0x3e), None);
        assert!(driver.registry().is_empty());
    }

    #[test]
    fn missing_functionality_fails_probe() {
        let (_, bus, driver) = setup(Functionality::SMBUS_WORD_DATA);
        let client = bus.new_device("plat_i2c_cpld", 0x3e).unwrap();
        let err = driver
            .probe(&client, &IDS[0])
            .expect_err("probe must fail without byte-data support");
        assert_eq!(
            err,
            DriverProbeError::Functionality {
                missing: Functionality::SMBUS_BYTE_DATA | Functionality::SMBUS_READ_BYTE
            }
        );
        assert_eq!(crate::error::Errno::errno(&err), -5);
        assert!(driver.registry().is_empty());
        assert_eq!(bus.bound_driver(0x3e), None);
    }

    #[test]
    fn remove_drops_record_and_attributes() {
        let (adapter, bus, driver) = setup(Functionality::SMBUS_EMUL);
        adapter.plug(0x3e, SimCpld::new(0x00));
        let client = bus.new_device("plat_i2c_cpld", 0x3e).unwrap();
        bus.delete_device(0x3e).unwrap();
        assert!(driver.registry().is_empty());
        assert!(client.attr_names().is_empty());
    }
}
