//! Device handle, initialization and command dispatch.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::debug;

use crate::codes;
use crate::config::DeviceConfig;
use crate::error::DriverError;
use crate::poller::Poller;
use crate::registers;
use crate::transport::SmbusTransport;

/// Firmware capability class of the supervisor, derived once from the
/// revision registers at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareGeneration {
    /// Original PIC firmware. Only the watchdog and reset subset is
    /// available; everything else is rejected without bus traffic.
    First,
    /// Firmware revision 2.0 or later with the full register set.
    Second,
}

/// Open handle to one supervisor device.
///
/// Set and get calls are expected to be serialized by the caller. The
/// supervision poller is the one concurrent piece; it shares only the
/// transport, the cached supervision byte and the watchdog flag with
/// the dispatch path.
pub struct Device {
    config: DeviceConfig,
    transport: Arc<Mutex<Box<dyn SmbusTransport>>>,
    fw_revision: [u8; registers::FW_REV_LEN],
    generation: FirmwareGeneration,
    debug_level: u32,
    wd_enabled: AtomicBool,
    sv_state: Arc<AtomicU8>,
    poller: Option<Poller>,
}

fn classify_generation(revision: &[u8; registers::FW_REV_LEN]) -> FirmwareGeneration {
    // Revision 2.0 and later populates all six registers with ASCII
    // digits; earlier firmware does not.
    if revision.iter().all(u8::is_ascii_digit) {
        FirmwareGeneration::Second
    } else {
        FirmwareGeneration::First
    }
}

impl Device {
    /// Probe and open the supervisor behind `transport`.
    ///
    /// Reads the firmware revision to classify the capability
    /// generation and, on second-generation firmware, seeds the
    /// watchdog flag from the device. Fails without leaking resources
    /// if the configuration is out of range or the device does not
    /// answer; no handle exists on error.
    pub fn open(
        mut transport: Box<dyn SmbusTransport>,
        config: DeviceConfig,
    ) -> Result<Device, DriverError> {
        config.validate()?;
        let address = config.device_address;

        let mut fw_revision = [0u8; registers::FW_REV_LEN];
        for (i, byte) in fw_revision.iter_mut().enumerate() {
            *byte = transport.read_byte_data(address, registers::fw_rev(i))?;
        }
        let generation = classify_generation(&fw_revision);
        debug!(
            "opened supervisor on bus {} at 0x{:02x}: revision {:?}, {:?}",
            config.bus_number,
            address,
            String::from_utf8_lossy(&fw_revision),
            generation,
        );

        let wd_enabled = match generation {
            FirmwareGeneration::Second => {
                transport.read_byte_data(address, registers::WDOG_STATE)? != 0
            }
            FirmwareGeneration::First => false,
        };

        Ok(Device {
            config,
            transport: Arc::new(Mutex::new(transport)),
            fw_revision,
            generation,
            debug_level: 0,
            wd_enabled: AtomicBool::new(wd_enabled),
            sv_state: Arc::new(AtomicU8::new(0)),
            poller: None,
        })
    }

    /// Firmware revision bytes read at open time.
    pub fn firmware_revision(&self) -> &[u8; registers::FW_REV_LEN] {
        &self.fw_revision
    }

    /// Capability generation of the attached firmware.
    pub fn generation(&self) -> FirmwareGeneration {
        self.generation
    }

    /// Configuration the handle was opened with.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Driver identification string.
    pub fn ident(&self) -> &'static str {
        concat!("PICSV board-supervisor driver ", env!("CARGO_PKG_VERSION"))
    }

    /// Interrupt status entry. The supervisor has no interrupt line, so
    /// an interrupt is never caused by this device.
    pub fn irq_caused_by_device(&self) -> bool {
        false
    }

    /// Execute a set operation.
    ///
    /// Base operations are handled on every firmware generation;
    /// extension operations fail with `UnsupportedOnFirmware` on
    /// first-generation hardware, and unrecognized codes with
    /// `UnknownCode`.
    pub fn set_stat(&mut self, code: u32, value: u32) -> Result<(), DriverError> {
        debug!("set_stat code=0x{:02x} value=0x{:x}", code, value);
        match code {
            codes::DEBUG_LEVEL => {
                self.debug_level = value;
                Ok(())
            }
            codes::CH_DIRECTION => {
                if value == codes::DIR_IN {
                    Ok(())
                } else {
                    Err(DriverError::IllegalDirection)
                }
            }
            codes::WDOG_START => self.watchdog_start(),
            codes::WDOG_STOP => self.watchdog_stop(),
            codes::WDOG_TRIGGER => self.watchdog_trigger(),
            codes::WDOG_TIME => self.watchdog_set_time(value),
            codes::SW_RESET => self.software_reset(value),
            codes::ERRCNT_CLEAR => self.clear_error_counters(),
            _ => Err(DriverError::UnknownCode(code)),
        }
    }

    /// Execute a get operation for the currently selected channel.
    ///
    /// The channel only matters for the per-channel voltage codes; the
    /// caller's framework context decides which channel is current.
    pub fn get_stat(&self, code: u32, channel: u8) -> Result<u32, DriverError> {
        debug!("get_stat code=0x{:02x} channel={}", code, channel);
        match code {
            codes::DEBUG_LEVEL => Ok(self.debug_level),
            codes::CH_COUNT => Ok(u32::from(registers::VOLT_CHANNELS)),
            codes::CH_DIRECTION => Ok(codes::DIR_IN),
            codes::CH_LENGTH => Ok(codes::CH_LENGTH_BITS),
            codes::CH_PROFILE => Ok(codes::PROFILE_WDOG),
            _ => self.get_stat_extended(code, channel),
        }
    }

    fn get_stat_extended(&self, code: u32, channel: u8) -> Result<u32, DriverError> {
        match code {
            codes::WDOG_TIME => {
                self.require_second_generation()?;
                let units = self.read_word_data(registers::WDOG_TIME)?;
                Ok(u32::from(units) * registers::WDOG_TIME_UNIT_MS)
            }
            codes::WDOG_STATUS => {
                self.require_second_generation()?;
                Ok(u32::from(self.read_byte_data(registers::WDOG_STATE)?))
            }
            codes::VOLT_IN => self.read_voltage(registers::volt_in, channel),
            codes::VOLT_NOM => self.read_voltage(registers::volt_nom, channel),
            codes::VOLT_DEV => self.read_voltage(registers::volt_dev, channel),
            codes::VOLT_SVSTATE => {
                self.require_second_generation()?;
                Ok(u32::from(self.supervision_state()))
            }
            codes::ERRCNT_WDOG_RESET => self.read_error_counter(registers::ERRCNT_WDOG_RESET),
            codes::ERRCNT_BIOS_1 => self.read_error_counter(registers::ERRCNT_BIOS_1),
            codes::ERRCNT_BIOS_2 => self.read_error_counter(registers::ERRCNT_BIOS_2),
            codes::ERRCNT_SLP_S5 => self.read_error_counter(registers::ERRCNT_SLP_S5),
            codes::ERRCNT_PLT_RST => self.read_error_counter(registers::ERRCNT_PLT_RST),
            codes::ERRCNT_TEMP => self.read_error_counter(registers::ERRCNT_TEMP),
            codes::ERRCNT_PROCHOT => self.read_error_counter(registers::ERRCNT_PROCHOT),
            _ => Err(DriverError::UnknownCode(code)),
        }
    }

    /// Start the watchdog. Second-generation firmware reports the new
    /// state back and must confirm the start.
    pub fn watchdog_start(&mut self) -> Result<(), DriverError> {
        self.write_byte(registers::WDOG_ON)?;
        if self.generation == FirmwareGeneration::Second
            && self.read_byte_data(registers::WDOG_STATE)? == 0
        {
            return Err(DriverError::DeviceNotReady);
        }
        self.wd_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop the watchdog. Second-generation firmware requires the
    /// disable keyword and must confirm the stop by readback.
    pub fn watchdog_stop(&mut self) -> Result<(), DriverError> {
        match self.generation {
            FirmwareGeneration::First => self.write_byte(registers::WDOG_OFF)?,
            FirmwareGeneration::Second => {
                self.write_byte_data(registers::WDOG_OFF, registers::WDOG_OFF_KEY)?;
                if self.read_byte_data(registers::WDOG_STATE)? != 0 {
                    return Err(DriverError::DeviceNotReady);
                }
            }
        }
        self.wd_enabled.store(false, Ordering::Relaxed);
        Ok(())
    }

    /// Retrigger the watchdog. Fails unless the watchdog is running.
    pub fn watchdog_trigger(&mut self) -> Result<(), DriverError> {
        if !self.wd_enabled.load(Ordering::Relaxed) {
            return Err(DriverError::DeviceNotReady);
        }
        self.write_byte(registers::WDOG_TRIG)
    }

    /// Program the watchdog timeout. `ms` must be a positive multiple
    /// of 100 no larger than 6 550 000.
    pub fn watchdog_set_time(&mut self, ms: u32) -> Result<(), DriverError> {
        if ms % registers::WDOG_TIME_UNIT_MS != 0
            || ms < registers::WDOG_TIME_UNIT_MS
            || ms > registers::WDOG_TIME_UNIT_MS * registers::WDOG_TIME_MAX_UNITS
        {
            return Err(DriverError::ParamOutOfRange(format!(
                "watchdog time {} ms",
                ms
            )));
        }
        let units = ms / registers::WDOG_TIME_UNIT_MS;
        self.write_word_data(registers::WDOG_TIME, units as u16)
    }

    /// Reset the board. Guarded by the reset keyword.
    pub fn software_reset(&mut self, key: u32) -> Result<(), DriverError> {
        if key != u32::from(registers::SW_RESET_KEY) {
            return Err(DriverError::ParamOutOfRange(format!("reset key 0x{:x}", key)));
        }
        match self.generation {
            FirmwareGeneration::First => self.write_byte(registers::SW_RESET),
            FirmwareGeneration::Second => {
                self.write_word_data(registers::SW_RESET, registers::SW_RESET_KEY)
            }
        }
    }

    /// Clear all persistent error counters on the device.
    pub fn clear_error_counters(&mut self) -> Result<(), DriverError> {
        self.require_second_generation()?;
        self.write_byte(registers::ERRCNT_CLEAR)
    }

    /// Last successfully polled supervision state. Always served from
    /// the cache and never from a fresh bus read; 0 until the first
    /// successful poll.
    pub fn supervision_state(&self) -> u8 {
        self.sv_state.load(Ordering::Relaxed)
    }

    /// Copy the firmware revision into `buf`, returning the number of
    /// bytes written.
    pub fn firmware_revision_block(&self, buf: &mut [u8]) -> Result<usize, DriverError> {
        self.require_second_generation()?;
        if buf.len() < registers::FW_REV_LEN {
            return Err(DriverError::BufferTooSmall {
                needed: registers::FW_REV_LEN,
                got: buf.len(),
            });
        }
        buf[..registers::FW_REV_LEN].copy_from_slice(&self.fw_revision);
        Ok(registers::FW_REV_LEN)
    }

    /// Subscribe `sink` to supervision notifications and start the poll
    /// timer. While subscribed, every poll that finds at least one
    /// channel out of range delivers the state byte to `sink` once.
    pub fn subscribe_supervision(&mut self, sink: Sender<u8>) -> Result<(), DriverError> {
        self.require_second_generation()?;
        if self.poller.is_some() {
            return Err(DriverError::AlreadySubscribed);
        }
        self.poller = Some(Poller::spawn(
            Arc::clone(&self.transport),
            self.config.device_address,
            Duration::from_millis(u64::from(self.config.poll_period_ms)),
            Arc::clone(&self.sv_state),
            sink,
        ));
        Ok(())
    }

    /// Cancel the poll timer and drop the sink. Once this returns, no
    /// further notification is delivered.
    pub fn unsubscribe_supervision(&mut self) -> Result<(), DriverError> {
        self.require_second_generation()?;
        match self.poller.take() {
            Some(mut poller) => {
                poller.stop();
                Ok(())
            }
            None => Err(DriverError::NotSubscribed),
        }
    }

    /// Release the poll timer and subscription, then the handle itself.
    /// Dropping the handle has the same effect.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
    }

    fn require_second_generation(&self) -> Result<(), DriverError> {
        match self.generation {
            FirmwareGeneration::Second => Ok(()),
            FirmwareGeneration::First => Err(DriverError::UnsupportedOnFirmware),
        }
    }

    fn read_voltage(&self, register: fn(u8) -> u8, channel: u8) -> Result<u32, DriverError> {
        self.require_second_generation()?;
        if channel >= registers::VOLT_CHANNELS {
            return Err(DriverError::ParamOutOfRange(format!("channel {}", channel)));
        }
        let raw = self.read_byte_data(register(channel))?;
        Ok(u32::from(raw) * registers::VOLT_UNIT_MV)
    }

    fn read_error_counter(&self, offset: u8) -> Result<u32, DriverError> {
        self.require_second_generation()?;
        Ok(u32::from(self.read_byte_data(offset)?))
    }

    fn read_byte_data(&self, offset: u8) -> Result<u8, DriverError> {
        let value = self
            .transport
            .lock()
            .unwrap()
            .read_byte_data(self.config.device_address, offset)?;
        Ok(value)
    }

    fn read_word_data(&self, offset: u8) -> Result<u16, DriverError> {
        let value = self
            .transport
            .lock()
            .unwrap()
            .read_word_data(self.config.device_address, offset)?;
        Ok(value)
    }

    fn write_byte(&self, command: u8) -> Result<(), DriverError> {
        self.transport
            .lock()
            .unwrap()
            .write_byte(self.config.device_address, command)?;
        Ok(())
    }

    fn write_byte_data(&self, offset: u8, value: u8) -> Result<(), DriverError> {
        self.transport
            .lock()
            .unwrap()
            .write_byte_data(self.config.device_address, offset, value)?;
        Ok(())
    }

    fn write_word_data(&self, offset: u8, value: u16) -> Result<(), DriverError> {
        self.transport
            .lock()
            .unwrap()
            .write_word_data(self.config.device_address, offset, value)?;
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.shutdown();
    }
}
