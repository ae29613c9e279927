//! Driver error types.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by the driver entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// A caller-supplied argument is malformed or out of range.
    #[error("parameter out of range: {0}")]
    ParamOutOfRange(String),

    /// The requested channel direction is not supported by this device.
    #[error("illegal channel direction")]
    IllegalDirection,

    /// The operation code is not recognized by either dispatch tier.
    #[error("unknown operation code 0x{0:04x}")]
    UnknownCode(u32),

    /// The operation requires second-generation firmware.
    #[error("operation not supported by first-generation firmware")]
    UnsupportedOnFirmware,

    /// The device rejected or did not carry out the request.
    #[error("device not ready")]
    DeviceNotReady,

    /// A supervision sink is already subscribed.
    #[error("supervision sink already subscribed")]
    AlreadySubscribed,

    /// No supervision sink is subscribed.
    #[error("no supervision sink subscribed")]
    NotSubscribed,

    /// The caller-supplied buffer cannot hold the result.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Minimum buffer size for this result.
        needed: usize,
        /// Size of the buffer that was supplied.
        got: usize,
    },

    /// An underlying bus transaction failed.
    #[error("bus transaction failed: {0}")]
    Bus(#[from] TransportError),
}
