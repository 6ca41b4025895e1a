use std::fmt::Debug;

use argh::FromArgs;
use eyre::{Result, WrapErr};
use linux_embedded_hal::{Delay, I2cdev};

use adt74x0::{BusScanner, DeviceStatus, HalBus, ScanConfig, ScanResult};

mod smbus;
use smbus::SmbusBus;

const DEFAULT_BUS: &str = "/dev/i2c-0";

#[derive(FromArgs)]
#[argh(description = "scan an I2C bus for ADT7410/ADT7420 temperature sensors")]
struct Args {
    #[argh(
        positional,
        default = "String::from(DEFAULT_BUS)",
        description = "I2C bus device path"
    )]
    bus: String,

    #[argh(
        switch,
        short = 'a',
        description = "probe all 128 addresses instead of the 0x48-0x4b strap range"
    )]
    all: bool,

    #[argh(
        switch,
        short = 'i',
        description = "check each device's ID register (needs a bus with working register reads)"
    )]
    verify_id: bool,

    #[argh(
        switch,
        short = 'd',
        description = "use direct I2C transfers instead of SMBus word access"
    )]
    direct: bool,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let config = if args.all {
        ScanConfig::all_addresses()
    } else {
        ScanConfig::new()
    }
    .verify_identity(args.verify_id);

    println!("# Scanning {} for ADT74x0...", args.bus);

    // Per-address failures end up in the ScanResult; only a failed open is fatal.
    if args.direct {
        let i2c = I2cdev::new(&args.bus).wrap_err_with(|| format!("unable to open {}", args.bus))?;
        let mut scanner = BusScanner::new(HalBus::new(i2c, Delay), config);
        report(&scanner.scan());
    } else {
        let bus =
            SmbusBus::open(&args.bus).wrap_err_with(|| format!("unable to open {}", args.bus))?;
        let mut scanner = BusScanner::new(bus, config);
        report(&scanner.scan());
    }

    Ok(())
}

fn report<E: Debug>(result: &ScanResult<E>) {
    for (addr, status) in result.iter() {
        if let Some(line) = status_line(addr, status) {
            println!("{}", line);
        }
    }
}

/// One line per probed address: bare `0xAA T.TTTTTC` readings, `#` comment lines for
/// failures so readings stay easy to grep out.
fn status_line<E: Debug>(addr: u8, status: &DeviceStatus<E>) -> Option<String> {
    match status {
        DeviceStatus::ReadOk(temp) => Some(format!("0x{:02x} {:.5}C", addr, temp.celsius())),
        DeviceStatus::InitFailed(e) => Some(format!("# 0x{:02x} init failed: {}", addr, e)),
        DeviceStatus::ReadFailed(e) => Some(format!("# 0x{:02x} read failed: {}", addr, e)),
        DeviceStatus::Unprobed | DeviceStatus::Candidate | DeviceStatus::Initialized => None,
    }
}
