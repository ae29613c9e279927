//! Driver for the PICSV board supervisor, a PIC microcontroller attached
//! to the SMBus of a single-board computer. The supervisor runs the
//! board watchdog, monitors up to seven supply voltages and keeps
//! persistent error counters for fault conditions such as a missed BIOS
//! start or a thermal cutout.
//!
//! The crate owns the device protocol only. Bus access is delegated to
//! an [`SmbusTransport`] implementation supplied by the caller, and all
//! set/get calls on a [`Device`] are expected to be serialized by the
//! caller. The voltage supervision poller is the one concurrent piece:
//! while subscribed it samples the device in the background and delivers
//! out-of-range states through a channel.
//!
//! Two firmware generations exist in the field. The driver probes the
//! revision registers at open time and restricts first-generation
//! devices to the watchdog/reset subset.
//!
//! ```rust,ignore
//! let transport: Box<dyn SmbusTransport> = open_bus(config.bus_number)?;
//! let mut device = Device::open(transport, DeviceConfig::default())?;
//!
//! device.watchdog_set_time(2000)?;
//! device.watchdog_start()?;
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! device.subscribe_supervision(tx)?;
//! for state in rx.iter() {
//!     println!("voltage out of range: {:#04x}", state);
//! }
//! ```

pub mod codes;
mod config;
mod device;
mod error;
#[cfg(test)]
mod mock;
mod poller;
pub mod registers;
mod transport;

pub use config::{
    DeviceConfig, DEFAULT_DEVICE_ADDRESS, DEFAULT_POLL_PERIOD_MS, POLL_PERIOD_MAX_MS,
    POLL_PERIOD_MIN_MS,
};
pub use device::{Device, FirmwareGeneration};
pub use error::DriverError;
pub use transport::{SmbusTransport, TransportError};
