//! SMBus transport abstraction.
//!
//! The supervisor sits on a numbered SMBus behind some host bus
//! controller. This crate never touches the bus hardware itself; it
//! issues single transactions through this trait and leaves timeouts and
//! retries to the implementation.

use thiserror::Error;

/// Errors reported by an [`SmbusTransport`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The device did not acknowledge its address or a data byte.
    #[error("device did not acknowledge")]
    Nack,

    /// The transaction did not complete in time.
    #[error("bus transaction timed out")]
    Timeout,

    /// Bus arbitration was lost to another master.
    #[error("bus arbitration lost")]
    ArbitrationLost,

    /// Any other backend-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Single SMBus transactions against a device address.
///
/// `offset` is the command byte of the SMBus protocol. Every method
/// performs exactly one bus transaction and may fail per transaction.
pub trait SmbusTransport: Send {
    /// Receive a single byte without a command byte.
    fn read_byte(&mut self, address: u16) -> Result<u8, TransportError>;

    /// Read one byte from a register offset.
    fn read_byte_data(&mut self, address: u16, offset: u8) -> Result<u8, TransportError>;

    /// Read a 16-bit word from a register offset.
    fn read_word_data(&mut self, address: u16, offset: u8) -> Result<u16, TransportError>;

    /// Send a bare command byte.
    fn write_byte(&mut self, address: u16, command: u8) -> Result<(), TransportError>;

    /// Write one byte to a register offset.
    fn write_byte_data(&mut self, address: u16, offset: u8, value: u8)
        -> Result<(), TransportError>;

    /// Write a 16-bit word to a register offset.
    fn write_word_data(&mut self, address: u16, offset: u8, value: u16)
        -> Result<(), TransportError>;
}
