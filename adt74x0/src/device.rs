use core::fmt;
use core::time::Duration;

use crate::bus::BusTransport;
use crate::temp::Temperature;

// ADT74x0 register map. T_LSB and STATUS are listed for completeness; the driver reads the
// temperature pair as one burst starting at T_MSB.
pub(crate) const T_MSB: u8 = 0x00;
#[allow(dead_code)]
pub(crate) const T_LSB: u8 = 0x01;
#[allow(dead_code)]
pub(crate) const STATUS: u8 = 0x02;
pub(crate) const CONFIG: u8 = 0x03;
pub(crate) const IDREG: u8 = 0x0b;
pub(crate) const RESET: u8 = 0x2f;

/// CONFIG value selecting 16-bit continuous conversions.
pub(crate) const CONFIG_16BIT: u8 = 0x80;

// Manufacturer ID occupies the top 5 bits of IDREG; the rest is the silicon revision.
pub(crate) const ID_MASK: u8 = 0xf8;
pub(crate) const ID_VALUE: u8 = 0xc8;

/// Settle time after a software reset. The datasheet asks for 200 us; a full millisecond
/// keeps slow bit-banged buses honest.
pub const RESET_SETTLE_DELAY: Duration = Duration::from_millis(1);

/// Wait for the first 16-bit conversion after configuration. Typically ~240 ms; a second
/// covers worst-case parts on noisy buses.
pub const CONVERSION_DELAY: Duration = Duration::from_secs(1);

/// Enum for describing the ways device initialization can fail. Each variant names the
/// register sequence step that failed; transport errors are carried through.
#[derive(Debug, PartialEq)]
pub enum InitError<E> {
    /// The transport could not address the device.
    SlaveSelect(E),
    /// The software reset command write failed.
    ResetWrite(E),
    /// The CONFIG register write failed.
    ConfigWrite(E),
    /// Reading IDREG failed. Only possible when identity verification is enabled.
    IdRead(E),
    /** IDREG was read but its manufacturer bits are not the ADT74x0 pattern. Contains the
    byte actually read. Only possible when identity verification is enabled. */
    IdentityMismatch(u8),
}

impl<E: fmt::Debug> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InitError::SlaveSelect(e) => write!(f, "could not select slave: {:?}", e),
            InitError::ResetWrite(e) => write!(f, "reset write failed: {:?}", e),
            InitError::ConfigWrite(e) => write!(f, "config write failed: {:?}", e),
            InitError::IdRead(e) => write!(f, "ID register read failed: {:?}", e),
            InitError::IdentityMismatch(id) => write!(f, "not an ADT74x0 (ID 0x{:02x})", id),
        }
    }
}

/// Enum for describing the ways a temperature read can fail.
#[derive(Debug, PartialEq)]
pub enum ReadError<E> {
    /// The transport could not address the device.
    SlaveSelect(E),
    /// Reading the temperature register pair failed.
    TempRead(E),
}

impl<E: fmt::Debug> fmt::Display for ReadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadError::SlaveSelect(e) => write!(f, "could not select slave: {:?}", e),
            ReadError::TempRead(e) => write!(f, "temperature read failed: {:?}", e),
        }
    }
}

/** A struct for driving the ADT74x0 register sequences against devices on one bus.

The struct owns its [BusTransport]; addresses are passed per call because one bus commonly
carries several of these sensors (the strap pins give each chip one of four addresses).
[initialize](Adt74x0::initialize) only starts a conversion — allow [CONVERSION_DELAY] before
expecting [read_temperature](Adt74x0::read_temperature) to return meaningful data. */
pub struct Adt74x0<T>
where
    T: BusTransport,
{
    bus: T,
}

impl<T> Adt74x0<T>
where
    T: BusTransport,
{
    pub fn new(bus: T) -> Self {
        Adt74x0 { bus }
    }

    /** Resets and configures the device at `address` for 16-bit continuous conversions.

    The sequence is: select the slave, write the software reset command, wait out
    [RESET_SETTLE_DELAY], then write CONFIG. With `verify_identity` set, IDREG is read
    afterwards and checked for the ADT74x0 manufacturer bits; leave it off on buses that
    cannot do register reads reliably (the Raspberry Pi's controller is the known offender)
    and absent devices will surface as write failures instead. */
    pub fn initialize(
        &mut self,
        address: u8,
        verify_identity: bool,
    ) -> Result<(), InitError<T::Error>> {
        self.bus.select(address).map_err(InitError::SlaveSelect)?;
        self.bus.write_bytes(&[RESET]).map_err(InitError::ResetWrite)?;

        self.bus.sleep(RESET_SETTLE_DELAY);

        self.bus
            .write_bytes(&[CONFIG, CONFIG_16BIT])
            .map_err(InitError::ConfigWrite)?;

        if verify_identity {
            let mut id = [0u8; 1];
            self.bus
                .read_register(IDREG, &mut id)
                .map_err(InitError::IdRead)?;

            if id[0] & ID_MASK != ID_VALUE {
                return Err(InitError::IdentityMismatch(id[0]));
            }
        }

        Ok(())
    }

    /// Reads the temperature register pair at `address` and decodes it. Only meaningful
    /// once a conversion has completed after [initialize](Adt74x0::initialize).
    pub fn read_temperature(&mut self, address: u8) -> Result<Temperature, ReadError<T::Error>> {
        self.bus.select(address).map_err(ReadError::SlaveSelect)?;

        let mut raw = [0u8; 2];
        self.bus
            .read_register(T_MSB, &mut raw)
            .map_err(ReadError::TempRead)?;

        Ok(Temperature::from_registers(raw[0], raw[1]))
    }

    pub(crate) fn bus_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    pub fn free(self) -> T {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::{Adt74x0, InitError, ReadError};
    use crate::bus::HalBus;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    fn mk_dev(expectations: &[I2cTransaction]) -> Adt74x0<HalBus<I2cMock, NoopDelay>> {
        Adt74x0::new(HalBus::new(I2cMock::new(expectations), NoopDelay))
    }

    fn finish(dev: Adt74x0<HalBus<I2cMock, NoopDelay>>) {
        let (mut i2c, _) = dev.free().free();
        i2c.done();
    }

    #[test]
    fn init_sequence() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x48, vec![0x2f]),
            I2cTransaction::write(0x48, vec![0x03, 0x80]),
        ]);

        assert_eq!(dev.initialize(0x48, false), Ok(()));
        finish(dev);
    }

    #[test]
    fn init_verifies_identity_when_asked() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x49, vec![0x2f]),
            I2cTransaction::write(0x49, vec![0x03, 0x80]),
            I2cTransaction::write_read(0x49, vec![0x0b], vec![0xc8]),
        ]);

        assert_eq!(dev.initialize(0x49, true), Ok(()));
        finish(dev);
    }

    #[test]
    fn identity_ignores_revision_bits() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x4a, vec![0x2f]),
            I2cTransaction::write(0x4a, vec![0x03, 0x80]),
            I2cTransaction::write_read(0x4a, vec![0x0b], vec![0xcb]),
        ]);

        // Only the top 5 manufacturer bits matter; the low bits are the silicon revision.
        assert_eq!(dev.initialize(0x4a, true), Ok(()));
        finish(dev);
    }

    #[test]
    fn init_rejects_foreign_id() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x48, vec![0x2f]),
            I2cTransaction::write(0x48, vec![0x03, 0x80]),
            I2cTransaction::write_read(0x48, vec![0x0b], vec![0xc0]),
        ]);

        assert_eq!(
            dev.initialize(0x48, true),
            Err(InitError::IdentityMismatch(0xc0))
        );
        finish(dev);
    }

    #[test]
    fn init_reset_write_failure() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x48, vec![0x2f]).with_error(ErrorKind::Other)
        ]);

        assert_eq!(
            dev.initialize(0x48, false),
            Err(InitError::ResetWrite(ErrorKind::Other))
        );
        finish(dev);
    }

    #[test]
    fn init_config_write_failure() {
        let mut dev = mk_dev(&[
            I2cTransaction::write(0x48, vec![0x2f]),
            I2cTransaction::write(0x48, vec![0x03, 0x80]).with_error(ErrorKind::Other),
        ]);

        assert_eq!(
            dev.initialize(0x48, false),
            Err(InitError::ConfigWrite(ErrorKind::Other))
        );
        finish(dev);
    }

    #[test]
    fn temperature_decodes_positive() {
        let mut dev = mk_dev(&[I2cTransaction::write_read(
            0x48,
            vec![0x00],
            vec![0x19, 0x00],
        )]);

        let temp = dev.read_temperature(0x48).unwrap();
        assert_eq!(temp.celsius(), 50.0);
        finish(dev);
    }

    #[test]
    fn temperature_decodes_negative() {
        let mut dev = mk_dev(&[I2cTransaction::write_read(
            0x48,
            vec![0x00],
            vec![0xff, 0x80],
        )]);

        let temp = dev.read_temperature(0x48).unwrap();
        assert_eq!(temp.celsius(), -1.0);
        finish(dev);
    }

    #[test]
    fn temperature_read_failure() {
        let mut dev = mk_dev(&[
            I2cTransaction::write_read(0x48, vec![0x00], vec![0x00, 0x00])
                .with_error(ErrorKind::Other),
        ]);

        assert_eq!(
            dev.read_temperature(0x48),
            Err(ReadError::TempRead(ErrorKind::Other))
        );
        finish(dev);
    }
}
