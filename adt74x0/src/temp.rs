use core::fmt;

use fixed::types::I9F7;

/** A temperature in degrees Celsius, as decoded from the 16-bit conversion mode.

The register pair is two's complement with 7 fractional bits, i.e. units of 1/128 degrees,
which maps directly onto [I9F7]. Construction is from the MSB/LSB pair in register-map
order; callers holding word-swapped bytes (SMBus word reads) must un-swap first, which the
[BusTransport](crate::BusTransport) backends already do. */
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Default, Clone, Copy)]
pub struct Temperature(I9F7);

impl Temperature {
    /// Decodes the temperature register pair, `msb` and `lsb` in register-map order.
    pub fn from_registers(msb: u8, lsb: u8) -> Self {
        Temperature(I9F7::from_bits(i16::from_be_bytes([msb, lsb])))
    }

    /// The raw two's-complement register value, in units of 1/128 degrees.
    pub fn to_bits(self) -> i16 {
        self.0.to_bits()
    }

    pub fn celsius(self) -> f64 {
        self.0.to_num()
    }
}

impl From<Temperature> for I9F7 {
    fn from(temp: Temperature) -> Self {
        temp.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::Temperature;

    #[test]
    fn positive_decode() {
        // 0x1900 = 6400 units of 1/128.
        let t = Temperature::from_registers(0x19, 0x00);
        assert_eq!(t.to_bits(), 6400);
        assert_eq!(t.celsius(), 50.0);
    }

    #[test]
    fn negative_decode() {
        // 0xff80 is -128 in two's complement.
        let t = Temperature::from_registers(0xff, 0x80);
        assert_eq!(t.to_bits(), -128);
        assert_eq!(t.celsius(), -1.0);
    }

    #[test]
    fn fractional_resolution() {
        let t = Temperature::from_registers(0x00, 0x01);
        assert_eq!(t.celsius(), 1.0 / 128.0);
    }

    #[test]
    fn ordering_crosses_zero() {
        let below = Temperature::from_registers(0xff, 0x80);
        let above = Temperature::from_registers(0x00, 0x80);
        assert!(below < above);
    }
}
