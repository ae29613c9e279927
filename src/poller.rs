//! Background voltage-supervision poller.
//!
//! While a sink is subscribed, a dedicated thread samples the
//! supervision-state register once per poll period. Every successful
//! sample replaces the cached byte; samples with at least one channel
//! out of range are forwarded to the sink. A failed read skips the tick
//! so a transient bus fault cannot kill the loop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use crate::registers;
use crate::transport::SmbusTransport;

pub(crate) type SharedTransport = Arc<Mutex<Box<dyn SmbusTransport>>>;

/// Timer resource and subscription, owned by the device handle while a
/// sink is subscribed.
pub(crate) struct Poller {
    terminator_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Poller {
    pub(crate) fn spawn(
        transport: SharedTransport,
        address: u16,
        period: Duration,
        sv_state: Arc<AtomicU8>,
        sink: Sender<u8>,
    ) -> Poller {
        let (terminator_tx, terminator_rx) = bounded(1);
        let thread = std::thread::spawn(move || {
            poll_supervision(transport, address, period, sv_state, sink, terminator_rx);
        });
        Poller {
            terminator_tx,
            thread: Some(thread),
        }
    }

    /// Cancel the timer and wait for the thread to exit. No notification
    /// is delivered after this returns.
    pub(crate) fn stop(&mut self) {
        let _ = self.terminator_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_supervision(
    transport: SharedTransport,
    address: u16,
    period: Duration,
    sv_state: Arc<AtomicU8>,
    sink: Sender<u8>,
    terminator_rx: Receiver<()>,
) {
    loop {
        match terminator_rx.recv_timeout(period) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => (),
        }

        let sample = transport
            .lock()
            .unwrap()
            .read_byte_data(address, registers::VOLT_SVSTATE);

        match sample {
            Ok(state) => {
                sv_state.store(state, Ordering::Relaxed);
                if state != 0 && sink.send(state).is_err() {
                    debug!("supervision sink disconnected, dropping notification");
                }
            }
            Err(e) => {
                debug!("supervision poll failed, skipping tick: {}", e);
            }
        }
    }
}
