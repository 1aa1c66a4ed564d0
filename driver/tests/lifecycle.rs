use i2c_cpld::{
    CpldDriver, I2cBus,
    cpld::{READ_ERROR, Register},
    dev::bus::BusError,
    dev::attr::AttrError,
};
use smbus::{
    Functionality, SmbusError,
    sim::{Op, SimAdapter, SimCpld},
};
use std::{sync::Arc, thread};

fn cpld(lpmode: u16, reset: u16) -> SimCpld {
    let sim = SimCpld::new(config::HIGH_REGISTER);
    let [lo, hi] = lpmode.to_le_bytes();
    sim.set_register(Register::QsfpLpMode0.into(), lo);
    sim.set_register(Register::QsfpLpMode1.into(), hi);
    let [lo, hi] = reset.to_le_bytes();
    sim.set_register(Register::QsfpResetCtrl0.into(), lo);
    sim.set_register(Register::QsfpResetCtrl1.into(), hi);
    sim
}

#[test]
fn detected_at_configured_address() {
    let _ = i2c_cpld::logging::init();
    let adapter = Arc::new(SimAdapter::new(1, Functionality::SMBUS_EMUL));
    adapter.plug(0x3e, cpld(0x1234, 0x0300));
    let bus = I2cBus::new(adapter.clone());
    let driver = Arc::new(CpldDriver::new());

    assert_eq!(bus.register_driver(driver.clone()), 1);
    let client = bus.client(0x3e).expect("client at 0x3e");
    assert_eq!(client.name(), "plat_i2c_cpld");
    assert_eq!(client.dev_name(), "1-003e");
    assert_eq!(bus.bound_driver(0x3e), Some("i2c_cpld"));
    assert_eq!(driver.registry().len(), 1);

    assert_eq!(bus.read_attribute(0x3e, "qsfp_lpmode").unwrap(), "0x1234\n");
    assert_eq!(bus.read_attribute(0x3e, "qsfp_reset").unwrap(), "0x0300\n");
    assert_eq!(
        bus.read_attribute(0x3e, "qsfp_modprs"),
        Err(BusError::Attr(AttrError::NotFound))
    );

    bus.delete_device(0x3e).unwrap();
    assert!(driver.registry().is_empty());
    assert_eq!(
        bus.read_attribute(0x3e, "qsfp_lpmode"),
        Err(BusError::NoSuchDevice(0x3e))
    );
}

#[test]
fn nothing_detected_on_empty_bus() {
    let adapter = Arc::new(SimAdapter::new(0, Functionality::SMBUS_EMUL));
    let bus = I2cBus::new(adapter);
    let driver = Arc::new(CpldDriver::new());
    assert_eq!(bus.register_driver(driver.clone()), 0);
    assert!(bus.clients().is_empty());
    assert!(driver.registry().is_empty());
}

#[test]
fn one_driver_many_devices() {
    let adapter_a = Arc::new(SimAdapter::new(0, Functionality::SMBUS_EMUL));
    let adapter_b = Arc::new(SimAdapter::new(1, Functionality::SMBUS_EMUL));
    let bus_a = I2cBus::new(adapter_a.clone());
    let bus_b = I2cBus::new(adapter_b.clone());
    let driver = Arc::new(CpldDriver::new());
    bus_a.register_driver(driver.clone());
    bus_b.register_driver(driver.clone());

    adapter_a.plug(0x3e, cpld(0x0001, 0x0000));
    adapter_a.plug(0x3f, cpld(0x0002, 0x0000));
    adapter_b.plug(0x3e, cpld(0x0003, 0x0000));
    bus_a.new_device("plat_i2c_cpld", 0x3e).unwrap();
    bus_a.new_device("plat_i2c_cpld", 0x3f).unwrap();
    bus_b.new_device("plat_i2c_cpld", 0x3e).unwrap();
    assert_eq!(driver.registry().len(), 3);

    assert_eq!(bus_a.read_attribute(0x3f, "qsfp_lpmode").unwrap(), "0x0002\n");
    assert_eq!(bus_b.read_attribute(0x3e, "qsfp_lpmode").unwrap(), "0x0003\n");

    bus_a.delete_device(0x3e).unwrap();
    assert_eq!(driver.registry().len(), 2);
    let mut left: Vec<u16> = driver.registry().records().iter().map(|r| r.addr()).collect();
    left.sort();
    assert_eq!(left, vec![0x3e, 0x3f]);
}

#[test]
fn bus_faults_surface_as_read_error() {
    let adapter = Arc::new(SimAdapter::new(0, Functionality::SMBUS_EMUL));
    let sim = cpld(0x1234, 0x0000);
    adapter.plug(0x3e, sim.clone());
    let bus = I2cBus::new(adapter);
    bus.register_driver(Arc::new(CpldDriver::new()));

    sim.fail_next(Op::WriteByteData, SmbusError::NoDeviceOrAddress);
    assert_eq!(bus.read_attribute(0x3e, "qsfp_lpmode").unwrap(), READ_ERROR);
    sim.set_present(false);
    assert_eq!(bus.read_attribute(0x3e, "qsfp_reset").unwrap(), READ_ERROR);
    sim.set_present(true);
    assert_eq!(bus.read_attribute(0x3e, "qsfp_lpmode").unwrap(), "0x1234\n");
}

#[test]
fn parallel_attribute_reads_stay_per_device() {
    let adapter = Arc::new(SimAdapter::new(0, Functionality::SMBUS_EMUL));
    adapter.plug(0x3e, cpld(0xaaaa, 0x0a0a));
    adapter.plug(0x3f, cpld(0x5555, 0x0505));
    let bus = Arc::new(I2cBus::new(adapter));
    bus.register_driver(Arc::new(CpldDriver::new()));
    bus.new_device("plat_i2c_cpld", 0x3f).unwrap();

    let workers: Vec<_> = [(0x3e, "0xaaaa\n", "0x0a0a\n"), (0x3f, "0x5555\n", "0x0505\n")]
        .into_iter()
        .map(|(addr, lpmode, reset)| {
            let bus = bus.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    assert_eq!(bus.read_attribute(addr, "qsfp_lpmode").unwrap(), lpmode);
                    assert_eq!(bus.read_attribute(addr, "qsfp_reset").unwrap(), reset);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn writes_go_through_the_record() {
    let adapter = Arc::new(SimAdapter::new(0, Functionality::SMBUS_EMUL));
    let sim = cpld(0x0000, 0x0000);
    adapter.plug(0x3e, sim.clone());
    let bus = I2cBus::new(adapter);
    let driver = Arc::new(CpldDriver::new());
    bus.register_driver(driver.clone());

    let client = bus.client(0x3e).unwrap();
    let data = driver.device(&client).unwrap();
    data.set_lpmode(0x0300).unwrap();
    assert_eq!(bus.read_attribute(0x3e, "qsfp_lpmode").unwrap(), "0x0300\n");
    data.write(Register::QsfpResetCtrl0.into(), 0xab).unwrap();
    assert_eq!(sim.register(0x10), 0xab);
}
