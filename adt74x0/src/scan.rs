use crate::bus::BusTransport;
use crate::device::{Adt74x0, InitError, ReadError, CONVERSION_DELAY};
use crate::temp::Temperature;

/// Size of the 7-bit I2C address space.
pub const I2C_ADDRESSES: usize = 128;

// Strap-pin addresses for the ADT74x0 family. A0/A1 give each chip one of four slots.
const FIRST_STRAP_ADDRESS: u8 = 0x48;
const LAST_STRAP_ADDRESS: u8 = 0x4b;

/** What a scan knows about one bus address. Each address moves through these monotonically
within a run: candidates become `Initialized` or `InitFailed`, and initialized devices
become `ReadOk` or `ReadFailed` after the conversion wait. `Unprobed` addresses are never
touched on the wire. */
#[derive(Debug, PartialEq)]
pub enum DeviceStatus<E> {
    /// Outside the configured candidate range; no bus I/O was attempted.
    Unprobed,
    /// In the candidate range but not yet probed. Never present in a finished [ScanResult].
    Candidate,
    /// Initialization succeeded; a conversion is running.
    Initialized,
    /// Initialization failed; the address was skipped for the rest of the run.
    InitFailed(InitError<E>),
    /// A live sensor with a decoded temperature.
    ReadOk(Temperature),
    /// Initialization succeeded but the temperature read did not.
    ReadFailed(ReadError<E>),
}

/** Which addresses to probe, and how hard to vet them.

The default covers the four strap addresses, which is cheap and leaves unrelated
peripherals alone. [all_addresses](ScanConfig::all_addresses) probes the whole 7-bit space
instead, for sensors strapped somewhere unexpected; anything that is not an ADT74x0 will
simply fail initialization. Identity verification reads IDREG back after configuration and
is off by default because some bus controllers cannot do register reads reliably. */
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    first: u8,
    last: u8,
    verify_identity: bool,
}

impl ScanConfig {
    /// Probe the four strap addresses, 0x48 through 0x4b.
    pub fn new() -> Self {
        ScanConfig {
            first: FIRST_STRAP_ADDRESS,
            last: LAST_STRAP_ADDRESS,
            verify_identity: false,
        }
    }

    /// Probe every address in the 7-bit space.
    pub fn all_addresses() -> Self {
        ScanConfig::new().range(0x00, 0x7f)
    }

    /// Probe the inclusive range `first..=last` instead, clamped to the 7-bit space.
    /// An inverted range is empty.
    pub fn range(mut self, first: u8, last: u8) -> Self {
        self.first = first.min(0x7f);
        self.last = last.min(0x7f);
        self
    }

    /// Read IDREG back after configuring each candidate and reject foreign devices.
    pub fn verify_identity(mut self, verify: bool) -> Self {
        self.verify_identity = verify;
        self
    }

    fn candidates(&self) -> core::ops::RangeInclusive<u8> {
        self.first..=self.last
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig::new()
    }
}

/// The outcome of one scan: a status for every address in the 7-bit space. Owned by the
/// caller; nothing is retained between runs.
#[derive(Debug)]
pub struct ScanResult<E> {
    statuses: [DeviceStatus<E>; I2C_ADDRESSES],
}

impl<E> ScanResult<E> {
    /// The status of `address`, or `None` outside the 7-bit space.
    pub fn status(&self, address: u8) -> Option<&DeviceStatus<E>> {
        self.statuses.get(usize::from(address))
    }

    /// All addresses with their statuses, in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &DeviceStatus<E>)> {
        self.statuses
            .iter()
            .enumerate()
            .map(|(addr, status)| (addr as u8, status))
    }

    /// The addresses that produced a temperature, in address order.
    pub fn temperatures(&self) -> impl Iterator<Item = (u8, Temperature)> + '_ {
        self.iter().filter_map(|(addr, status)| match status {
            DeviceStatus::ReadOk(temp) => Some((addr, *temp)),
            _ => None,
        })
    }
}

/** A struct for sweeping one bus for ADT74x0 sensors.

The scan runs in two passes so one conversion wait covers every device: pass 1 resets and
configures every candidate address, then the scanner sleeps out [CONVERSION_DELAY] once,
then pass 2 reads a temperature from every address that initialized. Per-address failures
are recorded and stepped over; only opening the bus in the first place can abort a run,
and that happens before a [BusScanner] exists. */
pub struct BusScanner<T>
where
    T: BusTransport,
{
    dev: Adt74x0<T>,
    config: ScanConfig,
}

impl<T> BusScanner<T>
where
    T: BusTransport,
{
    pub fn new(bus: T, config: ScanConfig) -> Self {
        BusScanner {
            dev: Adt74x0::new(bus),
            config,
        }
    }

    /// Runs one full scan. Blocks for at least [CONVERSION_DELAY].
    pub fn scan(&mut self) -> ScanResult<T::Error> {
        let mut statuses: [DeviceStatus<T::Error>; I2C_ADDRESSES] =
            core::array::from_fn(|_| DeviceStatus::Unprobed);

        for addr in self.config.candidates() {
            statuses[usize::from(addr)] = DeviceStatus::Candidate;
        }

        // Pass 1: reset and configure everything, kicking off conversions.
        for addr in self.config.candidates() {
            statuses[usize::from(addr)] =
                match self.dev.initialize(addr, self.config.verify_identity) {
                    Ok(()) => DeviceStatus::Initialized,
                    Err(e) => DeviceStatus::InitFailed(e),
                };
        }

        // One shared wait covers every device on the bus.
        self.dev.bus_mut().sleep(CONVERSION_DELAY);

        // Pass 2: collect results from whatever initialized.
        for addr in self.config.candidates() {
            if !matches!(statuses[usize::from(addr)], DeviceStatus::Initialized) {
                continue;
            }

            statuses[usize::from(addr)] = match self.dev.read_temperature(addr) {
                Ok(temp) => DeviceStatus::ReadOk(temp),
                Err(e) => DeviceStatus::ReadFailed(e),
            };
        }

        ScanResult { statuses }
    }

    pub fn free(self) -> T {
        self.dev.free()
    }
}
