/*! `adt74x0` is a driver crate for [Analog Devices ADT7410](https://www.analog.com/en/products/adt7410.html)
and [ADT7420](https://www.analog.com/en/products/adt7420.html) temperature sensors on an I2C bus.

Both chips share one register layout: a 16-bit temperature register pair at `0x00`/`0x01`, a
configuration register at `0x03`, an ID register at `0x0b`, and a software reset register at
`0x2f`. Temperatures are two's-complement fixed point with a resolution of 1/128 degrees
Celsius in 16-bit mode.

The crate is split along the seams a flaky bus forces on you:

* [BusTransport] abstracts "select a slave, write bytes, read a register" so the same protocol
  code runs over kernel SMBus calls or direct I2C transfers. [HalBus] adapts any
  [`embedded_hal`](https://github.com/rust-embedded/embedded-hal) I2C implementation.
* [Adt74x0] drives the reset/configure/identify/read register sequences against one address.
* [BusScanner] probes a range of candidate addresses in two passes (initialize everything,
  wait out one conversion, then read everything that initialized), so absent or broken
  devices cost a failed status instead of aborting the scan. */
#![no_std]

mod bus;
mod device;
mod scan;
mod temp;

pub use bus::{BusTransport, HalBus};
pub use device::{Adt74x0, InitError, ReadError, CONVERSION_DELAY, RESET_SETTLE_DELAY};
pub use scan::{BusScanner, DeviceStatus, ScanConfig, ScanResult, I2C_ADDRESSES};
pub use temp::Temperature;
