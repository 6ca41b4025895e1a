use std::fmt::Debug;
use std::thread;
use std::time::Duration;

use adt74x0::BusTransport;
use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};

/** The slice of SMBus functionality the kernel backend needs from a device node. Production
code goes through [LinuxI2CDevice]; tests substitute a scripted device. */
pub trait SmbusDevice {
    type Error: Debug;

    /// Binds the slave address for subsequent transfers (the `I2C_SLAVE` ioctl).
    fn select_slave(&mut self, address: u16) -> Result<(), Self::Error>;

    /// SMBus "send byte".
    fn write_byte(&mut self, value: u8) -> Result<(), Self::Error>;

    /// SMBus "write byte data".
    fn write_byte_data(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// SMBus "read byte data".
    fn read_byte_data(&mut self, register: u8) -> Result<u8, Self::Error>;

    /// SMBus "read word data". The first byte the device sends lands in the low byte of
    /// the word, per the SMBus spec.
    fn read_word_data(&mut self, register: u8) -> Result<u16, Self::Error>;

    /// Raw I2C write, for transfers with no SMBus shape.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl SmbusDevice for LinuxI2CDevice {
    type Error = LinuxI2CError;

    fn select_slave(&mut self, address: u16) -> Result<(), LinuxI2CError> {
        self.set_slave_address(address)
    }

    fn write_byte(&mut self, value: u8) -> Result<(), LinuxI2CError> {
        self.smbus_write_byte(value)
    }

    fn write_byte_data(&mut self, register: u8, value: u8) -> Result<(), LinuxI2CError> {
        self.smbus_write_byte_data(register, value)
    }

    fn read_byte_data(&mut self, register: u8) -> Result<u8, LinuxI2CError> {
        self.smbus_read_byte_data(register)
    }

    fn read_word_data(&mut self, register: u8) -> Result<u16, LinuxI2CError> {
        self.smbus_read_word_data(register)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), LinuxI2CError> {
        self.write(bytes)
    }
}

/** Kernel-mediated backend: slave selection is the `I2C_SLAVE` ioctl and transfers are
SMBus byte/word accesses through `/dev/i2c-*`.

SMBus word reads deliver the device's MSB in the low byte of the word, so
`read_register` un-swaps two-byte reads to honor the MSB-first contract. */
pub struct SmbusBus<D: SmbusDevice = LinuxI2CDevice> {
    dev: D,
}

impl SmbusBus<LinuxI2CDevice> {
    /// Opens the bus at `path`. The address bound here is arbitrary; `select` rebinds
    /// before every transfer.
    pub fn open(path: &str) -> Result<Self, LinuxI2CError> {
        let dev = LinuxI2CDevice::new(path, 0x48)?;
        Ok(SmbusBus { dev })
    }
}

impl<D: SmbusDevice> SmbusBus<D> {
    #[allow(dead_code)]
    pub fn new(dev: D) -> Self {
        SmbusBus { dev }
    }
}

impl<D: SmbusDevice> BusTransport for SmbusBus<D> {
    type Error = D::Error;

    fn select(&mut self, address: u8) -> Result<(), D::Error> {
        self.dev.select_slave(u16::from(address))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), D::Error> {
        match *bytes {
            [cmd] => self.dev.write_byte(cmd),
            [reg, val] => self.dev.write_byte_data(reg, val),
            _ => self.dev.write_raw(bytes),
        }
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), D::Error> {
        if buf.len() == 2 {
            let word = self.dev.read_word_data(reg)?;
            buf[0] = (word & 0xff) as u8;
            buf[1] = (word >> 8) as u8;
        } else {
            for (i, byte) in buf.iter_mut().enumerate() {
                *byte = self.dev.read_byte_data(reg + i as u8)?;
            }
        }
        Ok(())
    }

    fn sleep(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}
