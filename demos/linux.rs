//! Example that runs on Linux using a serial-USB-adapter.
//!
//! The modem is expected to be powered on already, as the adapter gives no access to the
//! `PWRKEY` and `RESET` lines.
use std::{env, io, thread, time::Duration};

use log::{error, info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use simcom_at::bearer::BearerConfig;
use simcom_at::http::HttpRequest;
use simcom_at::modem::Modem;

// Timer frequency in Hz
const TIMER_HZ: u32 = 1000;

// Time the modem gets to answer the first probe
const READY_TIMEOUT_MS: u32 = 10_000;

// Delay between retries of failed steps
const RETRY_DELAY: Duration = Duration::from_secs(5);

fn main() {
    env_logger::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        println!("Usage: {} <path-to-serial> <baudrate> <apn> <url>", args[0]);
        println!(
            "Example: {} /dev/ttyUSB0 115200 soracom.io http://demo.thingsboard.io/api/v1/token/telemetry",
            args[0]
        );
        println!("\nNote: To run the example with debug logging, run it like this:");
        println!("\n  RUST_LOG=trace cargo run --example linux --features log -- /dev/ttyUSB0 115200 soracom.io http://...");
        std::process::exit(1);
    }
    let dev = &args[1];
    let baud_rate: u32 = args[2].parse().expect("Invalid baud rate");
    let apn = &args[3];
    let url = &args[4];

    println!("Starting (dev={}, baud={:?})...", dev, baud_rate);

    // Open serial port
    let port = serialport::new(dev, baud_rate)
        .data_bits(DataBits::Eight)
        .flow_control(FlowControl::None)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(Duration::from_millis(10))
        .open()
        .expect("Could not open serial port");

    let mut modem: Modem<_, _, _, _, TIMER_HZ> =
        Modem::new(serial::Serial::new(port), timer::SysTimer::new(), pin::NoPin, pin::NoPin);

    if let Err(e) = modem.wait_until_ready(READY_TIMEOUT_MS) {
        error!("Modem not responding: {}", e);
        std::process::exit(1);
    }

    let imei = match modem.imei() {
        Ok(imei) => imei,
        Err(e) => {
            error!("Failed to read IMEI: {}", e);
            std::process::exit(1);
        }
    };
    println!("IMEI: {}", imei);

    let imsi = retry("IMSI", || modem.imsi().map_err(|e| e.to_string()));
    println!("IMSI: {}", imsi);

    match modem.firmware_version() {
        Ok(version) => println!("Firmware: {}", version),
        Err(e) => warn!("Failed to read firmware version: {}", e),
    }

    match modem.signal_quality() {
        Ok(quality) => println!("Signal: {:?} dBm (BER index {})", quality.rssi_dbm(), quality.ber),
        Err(e) => warn!("Failed to read signal quality: {}", e),
    }

    let config = BearerConfig::new(apn);
    retry("bearer", || modem.connect_bearer(&config).map_err(|e| format!("{:?}", e)));

    match modem.registration_status() {
        Ok(status) => println!("Registration: {:?}", status),
        Err(e) => warn!("Failed to read registration status: {}", e),
    }

    let payload = b"{\"temperature\": 3.14}";
    let request = HttpRequest::post(url, payload).content_type("application/json");

    loop {
        match modem.http_post(&request) {
            Ok(response) => info!("Posted telemetry, status {}", response.status),
            Err(e) => warn!("HTTP POST failed: {:?}", e),
        }

        thread::sleep(RETRY_DELAY);
    }
}

/// Repeats the step until it succeeds
fn retry<T>(name: &str, mut step: impl FnMut() -> Result<T, String>) -> T {
    loop {
        match step() {
            Ok(value) => return value,
            Err(e) => {
                warn!("Step {} failed: {}, retrying...", name, e);
                thread::sleep(RETRY_DELAY);
            }
        }
    }
}

mod serial {
    use super::*;
    use embedded_io::ErrorKind;
    use std::io::Read as _;

    /// Serial port wrapper implementing the non-blocking byte channel traits
    pub struct Serial {
        port: Box<dyn SerialPort>,
    }

    impl Serial {
        pub fn new(port: Box<dyn SerialPort>) -> Self {
            Self { port }
        }
    }

    fn map_error(e: io::Error) -> ErrorKind {
        match e.kind() {
            io::ErrorKind::TimedOut => ErrorKind::TimedOut,
            io::ErrorKind::Interrupted => ErrorKind::Interrupted,
            _ => ErrorKind::Other,
        }
    }

    impl embedded_io::ErrorType for Serial {
        type Error = ErrorKind;
    }

    impl embedded_io::Read for Serial {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.port.read(buf) {
                Ok(count) => Ok(count),
                Err(e) if e.kind() == io::ErrorKind::TimedOut || e.kind() == io::ErrorKind::WouldBlock => Ok(0),
                Err(e) => Err(map_error(e)),
            }
        }
    }

    impl embedded_io::ReadReady for Serial {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            let pending = self.port.bytes_to_read().map_err(|_| ErrorKind::Other)?;
            Ok(pending > 0)
        }
    }

    impl embedded_io::Write for Serial {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            io::Write::write(&mut self.port, buf).map_err(map_error)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            io::Write::flush(&mut self.port).map_err(map_error)
        }
    }
}

mod pin {
    use std::convert::Infallible;

    /// Placeholder for the control lines, which are not wired to the adapter
    pub struct NoPin;

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = Infallible;
    }

    impl embedded_hal::digital::OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }
}

mod timer {
    use std::{convert::TryInto, time::Instant as StdInstant};

    use fugit::Instant;
    use fugit_timer::Timer;

    /// A timer with millisecond precision.
    pub struct SysTimer {
        origin: StdInstant,
        start: StdInstant,
        duration_ms: u32,
        started: bool,
    }

    impl SysTimer {
        pub fn new() -> SysTimer {
            SysTimer {
                origin: StdInstant::now(),
                start: StdInstant::now(),
                duration_ms: 0,
                started: false,
            }
        }
    }

    impl Timer<1000> for SysTimer {
        type Error = &'static str;

        /// Return current time `Instant`
        fn now(&mut self) -> fugit::TimerInstantU32<1000> {
            let milliseconds = (StdInstant::now() - self.origin).as_millis();
            let ticks: u32 = milliseconds.try_into().expect("u32 timer overflow");
            Instant::<u32, 1, 1000>::from_ticks(ticks)
        }

        /// Start timer with a `duration`
        fn start(&mut self, duration: fugit::TimerDurationU32<1000>) -> Result<(), Self::Error> {
            self.start = StdInstant::now();
            self.duration_ms = duration.ticks();
            self.started = true;

            Ok(())
        }

        fn cancel(&mut self) -> Result<(), Self::Error> {
            if !self.started {
                Err("cannot cancel stopped timer")
            } else {
                self.started = false;
                Ok(())
            }
        }

        /// Must return `nb::Error::WouldBlock` as long as the timer `duration` is not over.
        fn wait(&mut self) -> nb::Result<(), Self::Error> {
            let now = StdInstant::now();
            if (now - self.start).as_millis() >= self.duration_ms.into() {
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        }
    }
}
