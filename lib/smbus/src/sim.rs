//! A simulated adapter with CPLD-style register files behind it.
//!
//! The CPLD model keeps 256 byte registers and a register pointer. A Write Byte to the
//! select command loads the pointer, Receive Byte returns the register it points at, and a
//! Write Word to the select command stores the high byte into the register named by the low
//! byte. Any other command addresses the register file directly.
//!
//! Every attempted transfer is logged, failed ones included. Faults are queued per
//! operation kind and fire once, optionally after letting a number of transfers through.
use crate::{Adapter, Functionality, SmbusDevice, SmbusError};
use alloc::{boxed::Box, collections::btree_map::BTreeMap, sync::Arc, vec, vec::Vec};
use log::trace;
use spin::{Mutex, RwLock};

/// Kinds of SMBus transfer, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    ReadByte,
    WriteByte,
    ReadByteData,
    WriteByteData,
    ReadWordData,
    WriteWordData,
}

/// One transfer as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    ReadByte,
    WriteByte(u8),
    ReadByteData(u8),
    WriteByteData { command: u8, value: u8 },
    ReadWordData(u8),
    WriteWordData { command: u8, value: u16 },
}

impl Transaction {
    pub fn op(&self) -> Op {
        match self {
            Transaction::ReadByte => Op::ReadByte,
            Transaction::WriteByte(_) => Op::WriteByte,
            Transaction::ReadByteData(_) => Op::ReadByteData,
            Transaction::WriteByteData { .. } => Op::WriteByteData,
            Transaction::ReadWordData(_) => Op::ReadWordData,
            Transaction::WriteWordData { .. } => Op::WriteWordData,
        }
    }
}

struct SimState {
    regs: [u8; 256],
    pointer: u8,
    select: u8,
    present: bool,
    log: Vec<Transaction>,
    faults: Vec<Fault>,
}

struct Fault {
    op: Op,
    skip: usize,
    err: SmbusError,
}

impl SimState {
    /// Log the attempt and consume a queued fault for its kind, if any.
    fn begin(&mut self, transaction: Transaction) -> Result<(), SmbusError> {
        trace!("sim: {:?}", transaction);
        self.log.push(transaction);
        if !self.present {
            return Err(SmbusError::NoDeviceOrAddress);
        }
        let op = transaction.op();
        if let Some(index) = self.faults.iter().position(|fault| fault.op == op) {
            if self.faults[index].skip == 0 {
                return Err(self.faults.remove(index).err);
            }
            self.faults[index].skip -= 1;
        }
        Ok(())
    }
}

/// A simulated CPLD. Clones share the same register file.
#[derive(Clone)]
pub struct SimCpld {
    state: Arc<Mutex<SimState>>,
}

impl SimCpld {
    pub fn new(select_command: u8) -> SimCpld {
        SimCpld {
            state: Arc::new(Mutex::new(SimState {
                regs: [0; 256],
                pointer: 0,
                select: select_command,
                present: true,
                log: vec![],
                faults: vec![],
            })),
        }
    }

    pub fn set_register(&self, reg: u8, value: u8) {
        self.state.lock().regs[reg as usize] = value;
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.state.lock().regs[reg as usize]
    }

    /// Make the next transfer of kind `op` fail with `err`. Faults queue up.
    pub fn fail_next(&self, op: Op, err: SmbusError) {
        self.fail_after(op, 0, err);
    }

    /// Let `skip` transfers of kind `op` through, then fail the next one with `err`.
    pub fn fail_after(&self, op: Op, skip: usize, err: SmbusError) {
        self.state.lock().faults.push(Fault { op, skip, err });
    }

    /// Stop (or resume) acknowledging transfers.
    pub fn set_present(&self, present: bool) {
        self.state.lock().present = present;
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().log.clone()
    }

    pub fn clear_transactions(&self) {
        self.state.lock().log.clear();
    }
}

impl SmbusDevice for SimCpld {
    fn read_byte(&mut self) -> Result<u8, SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::ReadByte)?;
        Ok(state.regs[state.pointer as usize])
    }

    fn write_byte(&mut self, value: u8) -> Result<(), SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::WriteByte(value))?;
        state.pointer = value;
        Ok(())
    }

    fn read_byte_data(&mut self, command: u8) -> Result<u8, SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::ReadByteData(command))?;
        Ok(state.regs[command as usize])
    }

    fn write_byte_data(&mut self, command: u8, value: u8) -> Result<(), SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::WriteByteData { command, value })?;
        if command == state.select {
            state.pointer = value;
        } else {
            state.regs[command as usize] = value;
        }
        Ok(())
    }

    fn read_word_data(&mut self, command: u8) -> Result<u16, SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::ReadWordData(command))?;
        let lo = state.regs[command as usize] as u16;
        let hi = state.regs[command.wrapping_add(1) as usize] as u16;
        Ok(lo | hi << 8)
    }

    fn write_word_data(&mut self, command: u8, value: u16) -> Result<(), SmbusError> {
        let mut state = self.state.lock();
        state.begin(Transaction::WriteWordData { command, value })?;
        let [lo, hi] = value.to_le_bytes();
        if command == state.select {
            state.regs[lo as usize] = hi;
        } else {
            state.regs[command as usize] = lo;
            state.regs[command.wrapping_add(1) as usize] = hi;
        }
        Ok(())
    }
}

/// Stands in for an address nobody answers on.
struct Vacant;

impl SmbusDevice for Vacant {
    fn read_byte(&mut self) -> Result<u8, SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
    fn write_byte(&mut self, _value: u8) -> Result<(), SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
    fn read_byte_data(&mut self, _command: u8) -> Result<u8, SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
    fn write_byte_data(&mut self, _command: u8, _value: u8) -> Result<(), SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
    fn read_word_data(&mut self, _command: u8) -> Result<u16, SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
    fn write_word_data(&mut self, _command: u8, _value: u16) -> Result<(), SmbusError> {
        Err(SmbusError::NoDeviceOrAddress)
    }
}

/// A simulated adapter; devices are placed on it by address.
pub struct SimAdapter {
    nr: u32,
    func: Functionality,
    devices: RwLock<BTreeMap<u16, SimCpld>>,
}

impl SimAdapter {
    pub fn new(nr: u32, func: Functionality) -> SimAdapter {
        SimAdapter {
            nr,
            func,
            devices: RwLock::new(BTreeMap::new()),
        }
    }

    /// Put `device` on the bus at `addr`, replacing whatever was there.
    pub fn plug(&self, addr: u16, device: SimCpld) {
        self.devices.write().insert(addr, device);
    }

    pub fn unplug(&self, addr: u16) -> Option<SimCpld> {
        self.devices.write().remove(&addr)
    }
}

impl Adapter for SimAdapter {
    fn nr(&self) -> u32 {
        self.nr
    }

    fn functionality(&self) -> Functionality {
        self.func
    }

    fn open(&self, addr: u16) -> Result<Box<dyn SmbusDevice>, SmbusError> {
        if addr > 0x7f {
            return Err(SmbusError::InvalidArgument);
        }
        match self.devices.read().get(&addr) {
            Some(dev) => Ok(Box::new(dev.clone())),
            None => Ok(Box::new(Vacant)),
        }
    }
}
