//! Adapter functionality bits, as in `linux/include/uapi/linux/i2c.h`.
use bitflags::bitflags;

bitflags! {
    /// What an adapter can do on the wire.
    pub struct Functionality: u32 {
        /// Plain I2C transfers
        const I2C                   = 0x00000001;
        /// 10-bit addressing
        const TEN_BIT_ADDR          = 0x00000002;
        /// Packet error checking
        const SMBUS_PEC             = 0x00000008;
        const SMBUS_QUICK           = 0x00010000;
        const SMBUS_READ_BYTE       = 0x00020000;
        const SMBUS_WRITE_BYTE      = 0x00040000;
        const SMBUS_READ_BYTE_DATA  = 0x00080000;
        const SMBUS_WRITE_BYTE_DATA = 0x00100000;
        const SMBUS_READ_WORD_DATA  = 0x00200000;
        const SMBUS_WRITE_WORD_DATA = 0x00400000;

        const SMBUS_BYTE = Self::SMBUS_READ_BYTE.bits | Self::SMBUS_WRITE_BYTE.bits;
        const SMBUS_BYTE_DATA = Self::SMBUS_READ_BYTE_DATA.bits | Self::SMBUS_WRITE_BYTE_DATA.bits;
        const SMBUS_WORD_DATA = Self::SMBUS_READ_WORD_DATA.bits | Self::SMBUS_WRITE_WORD_DATA.bits;
        /// What a typical SMBus controller offers
        const SMBUS_EMUL = Self::SMBUS_QUICK.bits
            | Self::SMBUS_BYTE.bits
            | Self::SMBUS_BYTE_DATA.bits
            | Self::SMBUS_WORD_DATA.bits;
    }
}
