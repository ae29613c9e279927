//! Register interface of the supervisor firmware.
//!
//! The firmware exposes its functionality as SMBus command bytes. Some
//! commands are bare (command byte only), some carry one data byte, and
//! some carry a 16-bit word. The offsets and units below are shared by
//! both firmware generations unless noted.

/// Enable the watchdog (bare command).
pub const WDOG_ON: u8 = 0x11;
/// Disable the watchdog. First-generation firmware takes the bare
/// command; revision 2.0 and later requires [`WDOG_OFF_KEY`] as the
/// data byte.
pub const WDOG_OFF: u8 = 0x12;
/// Keyword byte expected by the disable command.
pub const WDOG_OFF_KEY: u8 = 0x69;
/// Retrigger the watchdog (bare command).
pub const WDOG_TRIG: u8 = 0x13;
/// Watchdog timeout, a 16-bit word in units of [`WDOG_TIME_UNIT_MS`].
pub const WDOG_TIME: u8 = 0x14;
/// Watchdog state, one byte: 0 = off, 1 = on.
pub const WDOG_STATE: u8 = 0x17;
/// Granularity of the watchdog timeout register in milliseconds.
pub const WDOG_TIME_UNIT_MS: u32 = 100;
/// Largest value the timeout register accepts, in register units.
pub const WDOG_TIME_MAX_UNITS: u32 = 65_500;

/// Software reset. First-generation firmware takes the bare command;
/// revision 2.0 and later requires [`SW_RESET_KEY`] as a word.
pub const SW_RESET: u8 = 0x31;
/// Keyword guarding the software reset.
pub const SW_RESET_KEY: u16 = 0xdead;

/// Supervision state, one byte. Bit k set means supervised voltage k is
/// out of range; a voltage in range or not supervised reads as 0.
pub const VOLT_SVSTATE: u8 = 0x3a;

/// Number of supervised voltage channels.
pub const VOLT_CHANNELS: u8 = 7;
/// Voltage registers hold values in units of 25 mV.
pub const VOLT_UNIT_MV: u32 = 25;

/// Nominal voltage of a channel, or 0 if the channel is not supported.
pub fn volt_nom(channel: u8) -> u8 {
    0x40 + channel
}

/// Allowed deviation of a channel, in the same 25 mV units.
pub fn volt_dev(channel: u8) -> u8 {
    0x50 + channel
}

/// Measured input voltage of a channel.
pub fn volt_in(channel: u8) -> u8 {
    0x60 + channel
}

/// Error counter: watchdog expired without being triggered.
pub const ERRCNT_WDOG_RESET: u8 = 0x70;
/// Error counter: BIOS start state 1 not reached.
pub const ERRCNT_BIOS_1: u8 = 0x71;
/// Error counter: BIOS start state 2 not reached.
pub const ERRCNT_BIOS_2: u8 = 0x72;
/// Error counter: SLP_S5 signal not high.
pub const ERRCNT_SLP_S5: u8 = 0x73;
/// Error counter: PLT_RST signal not deasserted.
pub const ERRCNT_PLT_RST: u8 = 0x74;
/// Error counter: temperature emergency cutout.
pub const ERRCNT_TEMP: u8 = 0x75;
/// Error counter: processor hot.
pub const ERRCNT_PROCHOT: u8 = 0x76;
/// Clear all error counters (bare command).
pub const ERRCNT_CLEAR: u8 = 0x7a;

/// Firmware revision, six consecutive byte registers of ASCII text.
pub fn fw_rev(index: usize) -> u8 {
    0x80 + index as u8
}

/// Byte length of the firmware revision.
pub const FW_REV_LEN: usize = 6;
