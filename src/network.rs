//! # Network status queries
//!
//! Signal quality, packet domain registration, access technology and functionality level.
//!
//! ## Example
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! # use simcom_at::modem::Modem;
//! # use simcom_at::responses::RegistrationStatus;
//! #
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! let quality = modem.signal_quality().unwrap();
//! assert_eq!(Some(-83), quality.rssi_dbm());
//!
//! let status = modem.registration_status().unwrap();
//! assert_eq!(RegistrationStatus::RegisteredRoaming, status);
//! ````
use crate::engine::Framing;
use crate::error::Error;
use crate::modem::{Modem, QUERY_TIMEOUT_MS};
use crate::responses::{
    DigitFormat, Functionality, RegistrationStatus, SignalQuality, SystemMode, FUNCTIONALITY_FORMAT,
    REGISTRATION_FORMAT, SIGNAL_QUALITY_COMMAND, SYSTEM_MODE_FORMAT,
};
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

impl<S, T, PWR, RST, const TIMER_HZ: u32, const BUF_SIZE: usize> Modem<S, T, PWR, RST, TIMER_HZ, BUF_SIZE>
where
    S: Read + ReadReady + Write,
    T: Timer<TIMER_HZ>,
    PWR: OutputPin,
    RST: OutputPin,
{
    /// Returns the received signal strength and bit error rate
    pub fn signal_quality(&mut self) -> Result<SignalQuality, Error> {
        let response = self
            .engine
            .query_variable(SIGNAL_QUALITY_COMMAND, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        SignalQuality::parse(response.as_bytes())
    }

    /// Returns the packet domain registration status
    pub fn registration_status(&mut self) -> Result<RegistrationStatus, Error> {
        self.query_digit(&REGISTRATION_FORMAT).map(RegistrationStatus::from)
    }

    /// Returns the current radio access technology
    pub fn system_mode(&mut self) -> Result<SystemMode, Error> {
        self.query_digit(&SYSTEM_MODE_FORMAT).map(SystemMode::from)
    }

    /// Returns the current functionality level
    pub fn functionality(&mut self) -> Result<Functionality, Error> {
        self.query_digit(&FUNCTIONALITY_FORMAT).map(Functionality::from)
    }

    fn query_digit(&mut self, format: &DigitFormat) -> Result<u8, Error> {
        let response = self
            .engine
            .query_fixed(format.command, format.length, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        format.parse(response.as_bytes())
    }
}
