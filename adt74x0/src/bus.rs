use core::fmt::Debug;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/** Low-level bus operations the [Adt74x0](crate::Adt74x0) protocol layer is written against.

Implementations exist for kernel-mediated SMBus access and for direct I2C transfers; the
protocol layer never cares which. The one contract that differs between backends is byte
order, so it lives here: [read_register](BusTransport::read_register) always delivers bytes
MSB-first as laid out in the device register map, and an implementation whose underlying
access is word-oriented (SMBus word reads put the device MSB in the low byte) must un-swap
before returning. */
pub trait BusTransport {
    type Error: Debug;

    /// Selects the slave address for all subsequent operations, until the next call.
    fn select(&mut self, address: u8) -> Result<(), Self::Error>;

    /// Writes raw bytes to the selected slave. A single byte is a bare command write; a pair
    /// is a register write of `bytes[1]` to register `bytes[0]`.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads `buf.len()` bytes starting at register `reg` from the selected slave,
    /// MSB-first per the register map.
    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Blocks for at least `delay`.
    fn sleep(&mut self, delay: Duration);
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    type Error = T::Error;

    fn select(&mut self, address: u8) -> Result<(), Self::Error> {
        (**self).select(address)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_bytes(bytes)
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read_register(reg, buf)
    }

    fn sleep(&mut self, delay: Duration) {
        (**self).sleep(delay)
    }
}

/** [BusTransport] backend over any [`embedded_hal`] I2C bus plus a blocking delay.

Register reads go through `write_read`, i.e. a plain combined transaction: the device streams
its registers starting at the written pointer, MSB first, so no byte-order fixup is needed.
Slave selection is bookkeeping only; nothing touches the wire until the next write or read. */
pub struct HalBus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: Option<u8>,
}

impl<I2C, D> HalBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        HalBus {
            i2c,
            delay,
            address: None,
        }
    }

    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn address(&self) -> u8 {
        match self.address {
            Some(addr) => addr,
            None => panic!("select() must be called before any bus transfer"),
        }
    }
}

impl<I2C, D> BusTransport for HalBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = I2C::Error;

    fn select(&mut self, address: u8) -> Result<(), Self::Error> {
        self.address = Some(address);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let addr = self.address();
        self.i2c.write(addr, bytes)
    }

    fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let addr = self.address();
        self.i2c.write_read(addr, &[reg], buf)
    }

    fn sleep(&mut self, delay: Duration) {
        // DelayNs takes u32 microseconds; round sub-microsecond remainders up and chunk
        // long waits so the "at least `delay`" contract holds for any input.
        let mut us = (delay.as_nanos() + 999) / 1000;
        loop {
            let chunk = us.min(u128::from(u32::MAX)) as u32;
            self.delay.delay_us(chunk);
            us -= u128::from(chunk);
            if us == 0 {
                break;
            }
        }
    }
}
