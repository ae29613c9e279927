//! Scripted transport used by the unit tests.
//!
//! Emulates the supervisor register file closely enough for the driver
//! paths under test: the watchdog on/off commands update the state
//! register (unless the device is scripted as stuck), the counter-clear
//! command zeroes the counter bank, and word writes land in a word
//! register file. Reads and writes can be failed wholesale or per
//! offset, and every write is logged so tests can assert the exact
//! bytes put on the bus.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::registers;
use crate::transport::{SmbusTransport, TransportError};

#[derive(Debug, Default)]
struct MockState {
    regs: HashMap<u8, u8>,
    words: HashMap<u8, u16>,
    fail_all: bool,
    fail_offsets: HashSet<u8>,
    stuck_watchdog: bool,
    commands: Vec<u8>,
    byte_writes: Vec<(u8, u8)>,
    word_writes: Vec<(u8, u16)>,
}

impl MockState {
    fn failing(&self, offset: u8) -> bool {
        self.fail_all || self.fail_offsets.contains(&offset)
    }
}

/// Cloneable handle to a shared in-memory device model. Tests keep one
/// clone for inspection while the opened device owns another.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub(crate) fn new() -> MockTransport {
        MockTransport::default()
    }

    /// A device answering with an all-digit (second generation) revision.
    pub(crate) fn second_generation() -> MockTransport {
        let mock = MockTransport::new();
        mock.load_revision(b"020000");
        mock
    }

    /// A device whose revision registers do not read back as digits.
    pub(crate) fn first_generation() -> MockTransport {
        let mock = MockTransport::new();
        mock.load_revision(b"PIC1.0");
        mock
    }

    pub(crate) fn load_revision(&self, revision: &[u8; registers::FW_REV_LEN]) {
        let mut state = self.state.lock().unwrap();
        for (i, byte) in revision.iter().enumerate() {
            state.regs.insert(registers::fw_rev(i), *byte);
        }
    }

    pub(crate) fn set_reg(&self, offset: u8, value: u8) {
        self.state.lock().unwrap().regs.insert(offset, value);
    }

    pub(crate) fn set_word(&self, offset: u8, value: u16) {
        self.state.lock().unwrap().words.insert(offset, value);
    }

    pub(crate) fn fail_everything(&self, fail: bool) {
        self.state.lock().unwrap().fail_all = fail;
    }

    pub(crate) fn fail_offset(&self, offset: u8) {
        self.state.lock().unwrap().fail_offsets.insert(offset);
    }

    pub(crate) fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_all = false;
        state.fail_offsets.clear();
    }

    /// Make the device ignore watchdog on/off commands, so the state
    /// register no longer confirms them.
    pub(crate) fn stick_watchdog(&self) {
        self.state.lock().unwrap().stuck_watchdog = true;
    }

    /// Bare commands sent so far, in order.
    pub(crate) fn commands(&self) -> Vec<u8> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Byte-data writes sent so far, as (offset, value) pairs.
    pub(crate) fn byte_writes(&self) -> Vec<(u8, u8)> {
        self.state.lock().unwrap().byte_writes.clone()
    }

    /// Word-data writes sent so far, as (offset, value) pairs.
    pub(crate) fn word_writes(&self) -> Vec<(u8, u16)> {
        self.state.lock().unwrap().word_writes.clone()
    }
}

impl SmbusTransport for MockTransport {
    fn read_byte(&mut self, _address: u16) -> Result<u8, TransportError> {
        let state = self.state.lock().unwrap();
        if state.fail_all {
            return Err(TransportError::Nack);
        }
        Ok(0)
    }

    fn read_byte_data(&mut self, _address: u16, offset: u8) -> Result<u8, TransportError> {
        let state = self.state.lock().unwrap();
        if state.failing(offset) {
            return Err(TransportError::Nack);
        }
        Ok(state.regs.get(&offset).copied().unwrap_or(0))
    }

    fn read_word_data(&mut self, _address: u16, offset: u8) -> Result<u16, TransportError> {
        let state = self.state.lock().unwrap();
        if state.failing(offset) {
            return Err(TransportError::Nack);
        }
        Ok(state.words.get(&offset).copied().unwrap_or(0))
    }

    fn write_byte(&mut self, _address: u16, command: u8) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing(command) {
            return Err(TransportError::Nack);
        }
        state.commands.push(command);
        match command {
            registers::WDOG_ON if !state.stuck_watchdog => {
                state.regs.insert(registers::WDOG_STATE, 1);
            }
            registers::WDOG_OFF if !state.stuck_watchdog => {
                state.regs.insert(registers::WDOG_STATE, 0);
            }
            registers::ERRCNT_CLEAR => {
                for offset in registers::ERRCNT_WDOG_RESET..=registers::ERRCNT_PROCHOT {
                    state.regs.insert(offset, 0);
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn write_byte_data(
        &mut self,
        _address: u16,
        offset: u8,
        value: u8,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing(offset) {
            return Err(TransportError::Nack);
        }
        state.byte_writes.push((offset, value));
        if offset == registers::WDOG_OFF {
            if value == registers::WDOG_OFF_KEY && !state.stuck_watchdog {
                state.regs.insert(registers::WDOG_STATE, 0);
            }
        } else {
            state.regs.insert(offset, value);
        }
        Ok(())
    }

    fn write_word_data(
        &mut self,
        _address: u16,
        offset: u8,
        value: u16,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.failing(offset) {
            return Err(TransportError::Nack);
        }
        state.word_writes.push((offset, value));
        state.words.insert(offset, value);
        Ok(())
    }
}
