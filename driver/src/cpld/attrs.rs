use crate::{
    cpld::{CpldData, RegisterPair},
    dev::attr::{AttrMode, Attribute, AttributeGroup},
};
use log::debug;
use std::sync::Arc;

/// Text an attribute shows when the device does not answer.
pub const READ_ERROR: &str = "read error";

pub const ATTR_GROUP_NAME: &str = "i2c_cpld";

fn show_pair(data: &CpldData, pair: RegisterPair) -> String {
    match data.read_pair(pair) {
        Ok(value) => format!("0x{:04x}\n", value),
        Err(err) => {
            debug!("cpld {:#04x}: reading {:?} failed: {}", data.addr(), pair.lo, err);
            String::from(READ_ERROR)
        }
    }
}

/// Low power mode state of the transceivers, e.g. `0x0300\n`.
pub fn read_lpmode(data: &CpldData) -> String {
    show_pair(data, RegisterPair::LPMODE)
}

/// Reset state of the transceivers.
pub fn read_reset(data: &CpldData) -> String {
    show_pair(data, RegisterPair::RESET)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QsfpAttr {
    LpMode,
    Reset,
}

pub struct QsfpAttribute {
    kind: QsfpAttr,
    data: Arc<CpldData>,
}

impl QsfpAttribute {
    pub fn new(kind: QsfpAttr, data: Arc<CpldData>) -> QsfpAttribute {
        QsfpAttribute { kind, data }
    }

    /// Both attributes of a device, as the group published at probe.
    pub fn group(data: &Arc<CpldData>) -> AttributeGroup {
        AttributeGroup::new(
            ATTR_GROUP_NAME,
            vec![
                Box::new(QsfpAttribute::new(QsfpAttr::LpMode, data.clone())) as Box<dyn Attribute>,
                Box::new(QsfpAttribute::new(QsfpAttr::Reset, data.clone())),
            ],
        )
    }
}

impl Attribute for QsfpAttribute {
    fn name(&self) -> &'static str {
        match self.kind {
            QsfpAttr::LpMode => "qsfp_lpmode",
            QsfpAttr::Reset => "qsfp_reset",
        }
    }

    fn mode(&self) -> AttrMode {
        AttrMode::S_IRUGO
    }

    fn show(&self) -> String {
        match self.kind {
            QsfpAttr::LpMode => read_lpmode(&self.data),
            QsfpAttr::Reset => read_reset(&self.data),
        }
    }
}
