use crate::{
    cpld::{CpldVariant, Register, RegisterPair},
    dev::client::I2cClient,
    error::CpldError,
};
use utils::handle::{Handle, HandleRef};

/// Payload of the Write Word that stores `value` into register `reg`.
pub const fn encode_write(reg: u8, value: u8) -> u16 {
    (value as u16) << 8 | reg as u16
}

/// Per-device record kept in the client registry.
///
/// The record refers to its client without owning it; once the bus drops the client every
/// access fails with [CpldError::NoDevice].
#[derive(Debug)]
pub struct CpldData {
    client: HandleRef<I2cClient>,
    addr: u16,
    variant: CpldVariant,
}

impl CpldData {
    pub fn new(client: &Handle<I2cClient>, variant: CpldVariant) -> CpldData {
        CpldData {
            client: client.create_ref(),
            addr: client.addr(),
            variant,
        }
    }

    pub fn addr(&self) -> u16 {
        self.addr
    }

    pub fn variant(&self) -> CpldVariant {
        self.variant
    }

    pub fn client(&self) -> Option<Handle<I2cClient>> {
        self.client.get_handle()
    }

    /// Whether this record belongs to `client`.
    pub fn is_client(&self, client: &Handle<I2cClient>) -> bool {
        self.client.refers_to(client)
    }

    /// Read register `reg`: select it through the high register, then receive one byte.
    ///
    /// Both transfers run under the client's bus lock. If selecting fails, its error is
    /// returned and no read is attempted.
    pub fn read(&self, reg: u8) -> Result<u8, CpldError> {
        let client = self.client().ok_or(CpldError::NoDevice)?;
        let mut bus = client.lock_bus();
        bus.write_byte_data(config::HIGH_REGISTER, reg)?;
        let value = bus.read_byte()?;
        Ok(value)
    }

    /// Write `value` to register `reg` with a single Write Word.
    pub fn write(&self, reg: u8, value: u8) -> Result<(), CpldError> {
        let client = self.client().ok_or(CpldError::NoDevice)?;
        let mut bus = client.lock_bus();
        bus.write_word_data(config::HIGH_REGISTER, encode_write(reg, value))?;
        Ok(())
    }

    /// Read `pair.lo` then `pair.hi`; stops at the first failure.
    pub fn read_pair(&self, pair: RegisterPair) -> Result<u16, CpldError> {
        let lo = self.read(pair.lo.into())?;
        let hi = self.read(pair.hi.into())?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub fn write_pair(&self, pair: RegisterPair, value: u16) -> Result<(), CpldError> {
        let [lo, hi] = value.to_le_bytes();
        self.write(pair.lo.into(), lo)?;
        self.write(pair.hi.into(), hi)
    }

    pub fn version(&self) -> Result<u8, CpldError> {
        self.read(Register::Version.into())
    }

    pub fn lpmode(&self) -> Result<u16, CpldError> {
        self.read_pair(RegisterPair::LPMODE)
    }

    pub fn set_lpmode(&self, mask: u16) -> Result<(), CpldError> {
        self.write_pair(RegisterPair::LPMODE, mask)
    }

    pub fn reset(&self) -> Result<u16, CpldError> {
        self.read_pair(RegisterPair::RESET)
    }

    pub fn set_reset(&self, mask: u16) -> Result<(), CpldError> {
        self.write_pair(RegisterPair::RESET, mask)
    }

    pub fn module_presence(&self) -> Result<u16, CpldError> {
        self.read_pair(RegisterPair::MOD_PRESENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smbus::{
        Functionality, SmbusError,
        sim::{Op, SimCpld, Transaction},
    };
    use std::{sync::Arc, thread};

    fn device(sim: &SimCpld, addr: u16) -> (Handle<I2cClient>, CpldData) {
        let client = Handle::from(I2cClient::new(
            "plat_i2c_cpld",
            addr,
            0,
            Functionality::SMBUS_EMUL,
            Box::new(sim.clone()),
        ));
        let data = CpldData::new(&client, CpldVariant::Full);
        (client, data)
    }

    #[test]
    fn read_selects_then_receives() {
        let sim = SimCpld::new(0x00);
        sim.set_register(0x16, 0x81);
        let (_client, data) = device(&sim, 0x3e);
        assert_eq!(data.read(0x16), Ok(0x81));
        assert_eq!(
            sim.transactions(),
            vec![
                Transaction::WriteByteData {
                    command: 0x00,
                    value: 0x16
                },
                Transaction::ReadByte,
            ]
        );
    }

    #[test]
    fn failed_select_is_reported_and_stops() {
        let sim = SimCpld::new(0x00);
        sim.fail_next(Op::WriteByteData, SmbusError::NoDeviceOrAddress);
        let (_client, data) = device(&sim, 0x3e);
        assert_eq!(
            data.read(0x12),
            Err(CpldError::Bus(SmbusError::NoDeviceOrAddress))
        );
        assert!(!sim.transactions().contains(&Transaction::ReadByte));
    }

    #[test]
    fn failed_receive_is_reported() {
        let sim = SimCpld::new(0x00);
        sim.fail_next(Op::ReadByte, SmbusError::Timeout);
        let (_client, data) = device(&sim, 0x3e);
        assert_eq!(data.read(0x12), Err(CpldError::Bus(SmbusError::Timeout)));
    }

    #[test]
    fn write_packs_value_above_register() {
        assert_eq!(encode_write(0x10, 0xab), 0xab10);
        let sim = SimCpld::new(0x00);
        let (_client, data) = device(&sim, 0x3e);
        data.write(0x10, 0xab).unwrap();
        assert_eq!(
            sim.transactions(),
            vec![Transaction::WriteWordData {
                command: 0x00,
                value: 0xab10
            }]
        );
        assert_eq!(sim.register(0x10), 0xab);
    }

    #[test]
    fn write_failure_is_returned() {
        let sim = SimCpld::new(0x00);
        sim.fail_next(Op::WriteWordData, SmbusError::Io);
        let (_client, data) = device(&sim, 0x3e);
        assert_eq!(data.write(0x10, 0x01), Err(CpldError::Bus(SmbusError::Io)));
        assert_eq!(sim.register(0x10), 0x00);
    }

    #[test]
    fn pair_helpers_combine_low_and_high() {
        let sim = SimCpld::new(0x00);
        let (_client, data) = device(&sim, 0x3e);
        data.set_reset(0x0300).unwrap();
        assert_eq!(sim.register(0x10), 0x00);
        assert_eq!(sim.register(0x11), 0x03);
        assert_eq!(data.reset(), Ok(0x0300));
        sim.set_register(0x16, 0xff);
        assert_eq!(data.module_presence(), Ok(0x00ff));
        sim.set_register(0x00, 0x07);
        assert_eq!(data.version(), Ok(0x07));
    }

    #[test]
    fn dropped_client_means_no_device() {
        let sim = SimCpld::new(0x00);
        let (client, data) = device(&sim, 0x3e);
        drop(client);
        assert_eq!(data.read(0x10), Err(CpldError::NoDevice));
        assert!(sim.transactions().is_empty());
    }

    #[test]
    fn concurrent_reads_on_two_devices_do_not_mix() {
        let sim_a = SimCpld::new(0x00);
        let sim_b = SimCpld::new(0x00);
        for reg in 0x10..=0x17u8 {
            sim_a.set_register(reg, 0xa0 | (reg & 0x0f));
            sim_b.set_register(reg, 0xb0 | (reg & 0x0f));
        }
        let (_ca, a) = device(&sim_a, 0x3e);
        let (_cb, b) = device(&sim_b, 0x3f);
        let a = Arc::new(a);
        let b = Arc::new(b);

        let workers: Vec<_> = [(a, 0xa0u8), (b, 0xb0u8)]
            .into_iter()
            .flat_map(|(data, tag)| {
                (0..2).map(move |_| {
                    let data = data.clone();
                    thread::spawn(move || {
                        for i in 0..500u32 {
                            let reg = 0x10 + (i % 8) as u8;
                            assert_eq!(data.read(reg), Ok(tag | (reg & 0x0f)));
                        }
                    })
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
    }
}
