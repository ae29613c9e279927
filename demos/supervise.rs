//! Exercises the driver against a simulated supervisor device.
//!
//! Run with `cargo run --example supervise`. Set `RUST_LOG=debug` to see
//! the dispatch and poller logging.

use clap::{Arg, Command};

use picsv_driver::{codes, registers, Device, DeviceConfig, SmbusTransport, TransportError};

/// Simulated second-generation supervisor: a register file plus just
/// enough behavior for the watchdog sub-protocol, with one voltage
/// channel dipping out of range every fourth sample.
struct SimulatedSupervisor {
    regs: [u8; 256],
    wd_time: u16,
    ticks: u32,
}

impl SimulatedSupervisor {
    fn new() -> SimulatedSupervisor {
        let mut regs = [0u8; 256];
        for (i, byte) in b"020301".iter().enumerate() {
            regs[registers::fw_rev(i) as usize] = *byte;
        }
        // One supervised 3.3 V rail: nominal 3300 mV, 100 mV deviation.
        regs[registers::volt_nom(0) as usize] = 132;
        regs[registers::volt_dev(0) as usize] = 4;
        regs[registers::volt_in(0) as usize] = 132;
        SimulatedSupervisor {
            regs,
            wd_time: 10,
            ticks: 0,
        }
    }
}

impl SmbusTransport for SimulatedSupervisor {
    fn read_byte(&mut self, _address: u16) -> Result<u8, TransportError> {
        Ok(0)
    }

    fn read_byte_data(&mut self, _address: u16, offset: u8) -> Result<u8, TransportError> {
        if offset == registers::VOLT_SVSTATE {
            self.ticks += 1;
            let sagging = self.ticks % 4 == 0;
            self.regs[offset as usize] = u8::from(sagging);
            self.regs[registers::volt_in(0) as usize] = if sagging { 122 } else { 132 };
        }
        Ok(self.regs[offset as usize])
    }

    fn read_word_data(&mut self, _address: u16, offset: u8) -> Result<u16, TransportError> {
        if offset == registers::WDOG_TIME {
            Ok(self.wd_time)
        } else {
            Ok(0)
        }
    }

    fn write_byte(&mut self, _address: u16, command: u8) -> Result<(), TransportError> {
        match command {
            registers::WDOG_ON => self.regs[registers::WDOG_STATE as usize] = 1,
            registers::ERRCNT_CLEAR => {
                for offset in registers::ERRCNT_WDOG_RESET..=registers::ERRCNT_PROCHOT {
                    self.regs[offset as usize] = 0;
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
        if offset == registers::WDOG_OFF && value == registers::WDOG_OFF_KEY {
            self.regs[registers::WDOG_STATE as usize] = 0;
        } else {
            self.regs[offset as usize] = value;
        }
        Ok(())
    }

    fn write_word_data(
        &mut self,
        _address: u16,
        offset: u8,
        value: u16,
    ) -> Result<(), TransportError> {
        if offset == registers::WDOG_TIME {
            self.wd_time = value;
        }
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("supervise")
        .about("Exercises the supervisor driver against a simulated device")
        .disable_version_flag(true)
        .arg(
            Arg::new("period")
                .long("period")
                .help("Supervision poll period in milliseconds")
                .default_value("100"),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .help("Number of out-of-range notifications to wait for")
                .default_value("3"),
        )
        .get_matches();

    let period: u32 = matches
        .value_of("period")
        .unwrap()
        .parse()
        .expect("period must be a number");
    let samples: usize = matches
        .value_of("samples")
        .unwrap()
        .parse()
        .expect("samples must be a number");

    let config = DeviceConfig {
        poll_period_ms: period,
        ..DeviceConfig::default()
    };
    let mut device = Device::open(Box::new(SimulatedSupervisor::new()), config)
        .expect("failed to open the simulated supervisor");

    println!("{}", device.ident());
    println!(
        "firmware revision {:?} ({:?})",
        String::from_utf8_lossy(device.firmware_revision()),
        device.generation(),
    );

    device.watchdog_set_time(2000).expect("set watchdog time");
    device.watchdog_start().expect("start watchdog");
    println!(
        "watchdog armed, timeout {} ms",
        device
            .get_stat(codes::WDOG_TIME, 0)
            .expect("get watchdog time")
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    device.subscribe_supervision(tx).expect("subscribe");

    for _ in 0..samples {
        let state = rx.recv().expect("supervision notification");
        let millivolts = device
            .get_stat(codes::VOLT_IN, 0)
            .expect("read channel voltage");
        println!(
            "voltage out of range: state {:#04x}, channel 0 at {} mV",
            state, millivolts
        );
        device.watchdog_trigger().expect("trigger watchdog");
    }

    device.unsubscribe_supervision().expect("unsubscribe");
    device.watchdog_stop().expect("stop watchdog");
    device.close();
}
