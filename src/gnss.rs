//! # GNSS
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! # use simcom_at::modem::Modem;
//! #
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! modem.enable_gnss().unwrap();
//!
//! let navigation = modem.navigation_info().unwrap();
//! assert!(navigation.has_fix());
//! assert_eq!(Some(52.520008), navigation.latitude());
//! ````
use crate::commands::GnssPowerCommand;
use crate::engine::Framing;
use crate::error::Error;
use crate::modem::{Modem, QUERY_TIMEOUT_MS};
use crate::responses::{NavigationInfo, NAVIGATION_COMMAND};
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
    /// Powers the GNSS engine on
    pub fn enable_gnss(&mut self) -> Result<(), Error> {
        self.send_command(GnssPowerCommand::on())
    }

    /// Powers the GNSS engine off
    pub fn disable_gnss(&mut self) -> Result<(), Error> {
        self.send_command(GnssPowerCommand::off())
    }

    /// Returns the current navigation information. The result borrows the driver.
    pub fn navigation_info(&mut self) -> Result<NavigationInfo<'_>, Error> {
        let response = self
            .engine
            .query_variable(NAVIGATION_COMMAND, QUERY_TIMEOUT_MS, Framing::DataThenOk)?;
        Ok(NavigationInfo::new(response.into_str()?))
    }
}
