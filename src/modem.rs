//! # SIM7000 modem driver
//!
//! Power sequencing, the readiness probe and identity queries. Network, GNSS, bearer and HTTP
//! operations are implemented in their own modules on the same [Modem] type.
//!
//! ## Example
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! # use simcom_at::modem::Modem;
//! #
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! // Resets the module and waits until it answers
//! modem.init().unwrap();
//!
//! let imei = modem.imei().unwrap();
//! assert_eq!("869951030000012", imei.as_str());
//!
//! let firmware = modem.firmware_version().unwrap();
//! assert_eq!("Revision:1351B04SIM7000G", firmware.as_str());
//! ````
use crate::commands::{AtCommand, CommandErrorHandler, CommandText, EchoOffCommand};
use crate::engine::{Engine, Framing};
use crate::error::Error;
use crate::responses::{FirmwareVersion, Imei, Imsi, FIRMWARE_VERSION_LEN, IMEI_LEN, IMSI_LEN};
use crate::timing::{BOOT_TIMEOUT_MS, POWER_OFF_PULSE_MS, POWER_ON_PULSE_MS, RESET_PULSE_MS};
use crate::transport::Deadline;
use core::str::FromStr;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};
use fugit::TimerDurationU32;
use fugit_timer::Timer;

/// Default capacity of the response buffer in bytes
pub const DEFAULT_BUF_SIZE: usize = 512;

/// Timeout in ms for the first response byte of simple queries
pub(crate) const QUERY_TIMEOUT_MS: u32 = 1_000;

/// Session state of the modem
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerState {
    /// Not powered or powered down by [Modem::power_down]
    Off,

    /// Reset pulse is applied
    ResetAsserted,

    /// Waiting for the module to answer the echo probe
    Probing,

    /// Module answered the echo probe
    Ready,
}

/// Driver of a SIM7000 modem
///
/// PWR: Output driving the `PWRKEY` line, active low
///
/// RST: Output driving the `RESET` line, active low
///
/// BUF_SIZE: Capacity of the response buffer in bytes, see [Engine]
pub struct Modem<S, T, PWR, RST, const TIMER_HZ: u32, const BUF_SIZE: usize = DEFAULT_BUF_SIZE> {
    /// Command engine
    pub(crate) engine: Engine<S, T, TIMER_HZ, BUF_SIZE>,

    power_pin: PWR,

    reset_pin: RST,

    state: PowerState,

    /// Time the module gets to answer after power on or reset
    boot_timeout_ms: u32,
}

impl<S, T, PWR, RST, const TIMER_HZ: u32, const BUF_SIZE: usize> Modem<S, T, PWR, RST, TIMER_HZ, BUF_SIZE>
where
    S: Read + ReadReady + Write,
    T: Timer<TIMER_HZ>,
    PWR: OutputPin,
    RST: OutputPin,
{
    /// Creates a new driver. The modem is assumed to be powered off until one of [Self::init],
    /// [Self::power_up] or [Self::wait_until_ready] succeeded.
    pub fn new(serial: S, timer: T, power_pin: PWR, reset_pin: RST) -> Self {
        Self {
            engine: Engine::new(serial, timer),
            power_pin,
            reset_pin,
            state: PowerState::Off,
            boot_timeout_ms: BOOT_TIMEOUT_MS,
        }
    }

    /// Returns the current session state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Sets the time the module gets to answer after power on or reset in ms
    pub fn set_boot_timeout_ms(&mut self, timeout: u32) {
        self.boot_timeout_ms = timeout;
    }

    /// Gives access to the command engine for commands not covered by this driver
    pub fn engine(&mut self) -> &mut Engine<S, T, TIMER_HZ, BUF_SIZE> {
        &mut self.engine
    }

    /// Releases the serial channel, the timer and both pins
    pub fn release(self) -> (S, T, PWR, RST) {
        let transport = self.engine.transport;
        (transport.serial, transport.timer, self.power_pin, self.reset_pin)
    }

    /// Drives both control lines to their idle level, resets the module and waits until it
    /// answers the echo probe
    pub fn init(&mut self) -> Result<(), Error> {
        self.power_pin.set_high().map_err(|_| Error::Pin)?;
        self.reset_pin.set_high().map_err(|_| Error::Pin)?;

        self.reset()
    }

    /// Switches the module on and waits until it answers the echo probe
    pub fn power_up(&mut self) -> Result<(), Error> {
        info!("Powering up modem");
        self.assert_power_pulse(POWER_ON_PULSE_MS)?;
        self.wait_until_ready(self.boot_timeout_ms)
    }

    /// Switches the module off gracefully
    pub fn power_down(&mut self) -> Result<(), Error> {
        info!("Powering down modem");
        self.assert_power_pulse(POWER_OFF_PULSE_MS)?;
        self.state = PowerState::Off;
        Ok(())
    }

    /// Resets the module and waits until it answers the echo probe
    pub fn reset(&mut self) -> Result<(), Error> {
        info!("Resetting modem");
        self.state = PowerState::ResetAsserted;
        self.assert_reset_pulse(RESET_PULSE_MS)?;
        self.wait_until_ready(self.boot_timeout_ms)
    }

    /// Pulls `PWRKEY` low for the given duration
    pub fn assert_power_pulse(&mut self, duration_ms: u32) -> Result<(), Error> {
        Self::pulse(&mut self.power_pin, &mut self.engine.transport.timer, duration_ms)
    }

    /// Pulls `RESET` low for the given duration
    pub fn assert_reset_pulse(&mut self, duration_ms: u32) -> Result<(), Error> {
        Self::pulse(&mut self.reset_pin, &mut self.engine.transport.timer, duration_ms)
    }

    /// Drives the pin low for the given duration. The pin is released even if the timer failed.
    fn pulse<P: OutputPin>(pin: &mut P, timer: &mut T, duration_ms: u32) -> Result<(), Error> {
        pin.set_low().map_err(|_| Error::Pin)?;

        let hold = match timer.start(TimerDurationU32::millis(duration_ms)) {
            Ok(_) => nb::block!(timer.wait()).map_err(|_| Error::Timer),
            Err(_) => Err(Error::Timer),
        };

        pin.set_high().map_err(|_| Error::Pin)?;
        hold
    }

    /// Disables the command echo, fails if the module doesn't answer with OK
    pub fn probe(&mut self) -> Result<(), Error> {
        self.send_command(EchoOffCommand)
    }

    /// Repeats the echo probe until the module answers or the timeout expired
    ///
    /// Every probe waits [crate::transport::CHARACTER_TIMEOUT_MS] for an answer, so the module
    /// gets probed roughly ten times a second. Peripheral faults abort immediately.
    pub fn wait_until_ready(&mut self, timeout_ms: u32) -> Result<(), Error> {
        self.state = PowerState::Probing;
        let deadline = Deadline::start(&mut self.engine.transport.timer, timeout_ms);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            match self.probe() {
                Ok(_) => {
                    debug!("Modem ready after {} probes", attempts);
                    self.state = PowerState::Ready;
                    return Ok(());
                }
                Err(error) if error.is_transient() => trace!("Probe {} failed: {:?}", attempts, error),
                Err(error) => return Err(error),
            }

            if deadline.is_expired(&mut self.engine.transport.timer) {
                warn!("Modem not ready after {} probes", attempts);
                return Err(Error::Timeout);
            }
        }
    }

    /// Returns the IMEI
    pub fn imei(&mut self) -> Result<Imei, Error> {
        let response = self
            .engine
            .query_fixed("AT+GSN", IMEI_LEN, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        Imei::from_str(response.as_str()?).map_err(|_| Error::Capacity)
    }

    /// Returns the IMSI of the inserted SIM
    pub fn imsi(&mut self) -> Result<Imsi, Error> {
        let response = self
            .engine
            .query_fixed("AT+CIMI", IMSI_LEN, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        Imsi::from_str(response.as_str()?).map_err(|_| Error::Capacity)
    }

    /// Returns the firmware revision
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, Error> {
        let response =
            self.engine
                .query_fixed("AT+CGMR", FIRMWARE_VERSION_LEN, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        FirmwareVersion::from_str(response.as_str()?).map_err(|_| Error::Capacity)
    }

    /// Sends a command and maps the error if the command failed
    pub fn send_command<Cmd: AtCommand + CommandErrorHandler>(&mut self, command: Cmd) -> Result<(), Cmd::Error> {
        let mut text = CommandText::new();
        command.write(&mut text).map_err(|error| command.command_error(error))?;

        self.engine
            .send_and_confirm(&text, Cmd::RESPONSE, Cmd::TIMEOUT_MS)
            .map_err(|error| {
                warn!("Command {} failed: {:?}", text.as_str(), error);
                command.command_error(error)
            })
    }
}
