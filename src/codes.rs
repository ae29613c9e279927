//! Operation codes accepted by the set/get entry points.
//!
//! Dispatch is two-tiered: a base table available on every firmware
//! generation, and an extension table that is consulted on a base miss
//! only when the device runs second-generation firmware. A code from
//! the extension table fails with `UnsupportedOnFirmware` on
//! first-generation hardware; a code in neither table fails with
//! `UnknownCode`.

// ============================================================================
// Base table (all firmware generations)
// ============================================================================

/// Set/get the driver-local debug level.
pub const DEBUG_LEVEL: u32 = 0x01;
/// Channel direction. Settable only to [`DIR_IN`]; gets return [`DIR_IN`].
pub const CH_DIRECTION: u32 = 0x02;
/// Number of device channels (get only).
pub const CH_COUNT: u32 = 0x03;
/// Channel width in bits (get only).
pub const CH_LENGTH: u32 = 0x04;
/// Channel profile (get only), always [`PROFILE_WDOG`].
pub const CH_PROFILE: u32 = 0x05;
/// Start the watchdog (set only).
pub const WDOG_START: u32 = 0x06;
/// Stop the watchdog (set only).
pub const WDOG_STOP: u32 = 0x07;
/// Retrigger the watchdog (set only).
pub const WDOG_TRIGGER: u32 = 0x08;
/// Watchdog timeout in milliseconds. Set works on every generation;
/// get requires second-generation firmware.
pub const WDOG_TIME: u32 = 0x09;
/// Software reset, guarded by the 0xdead keyword (set only).
pub const SW_RESET: u32 = 0x0a;

// ============================================================================
// Extension table (second-generation firmware only)
// ============================================================================

/// Watchdog state as reported by the device (get only).
pub const WDOG_STATUS: u32 = 0x20;
/// Measured input voltage of the current channel in mV (get only).
pub const VOLT_IN: u32 = 0x21;
/// Nominal voltage of the current channel in mV (get only).
pub const VOLT_NOM: u32 = 0x22;
/// Allowed voltage deviation of the current channel in mV (get only).
pub const VOLT_DEV: u32 = 0x23;
/// Last polled supervision state, served from the cache (get only).
pub const VOLT_SVSTATE: u32 = 0x24;
/// Error counter: watchdog reset (get only).
pub const ERRCNT_WDOG_RESET: u32 = 0x25;
/// Error counter: no BIOS start state 1 (get only).
pub const ERRCNT_BIOS_1: u32 = 0x26;
/// Error counter: no BIOS start state 2 (get only).
pub const ERRCNT_BIOS_2: u32 = 0x27;
/// Error counter: SLP_S5 not high (get only).
pub const ERRCNT_SLP_S5: u32 = 0x28;
/// Error counter: PLT_RST not deasserted (get only).
pub const ERRCNT_PLT_RST: u32 = 0x29;
/// Error counter: temperature emergency cutout (get only).
pub const ERRCNT_TEMP: u32 = 0x2a;
/// Error counter: processor hot (get only).
pub const ERRCNT_PROCHOT: u32 = 0x2b;
/// Clear all error counters (set only).
pub const ERRCNT_CLEAR: u32 = 0x2c;

// ============================================================================
// Values reported or accepted by the channel operations
// ============================================================================

/// Channel direction value: input.
pub const DIR_IN: u32 = 1;
/// Channel direction value: output. Never valid for this device.
pub const DIR_OUT: u32 = 2;
/// Channel profile reported for every channel.
pub const PROFILE_WDOG: u32 = 4;
/// Channel width reported for every channel, in bits.
pub const CH_LENGTH_BITS: u32 = 32;
