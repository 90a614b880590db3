//! # Packet data bearer
//!
//! Defines the PDP context, attaches to the packet domain and opens bearer profile 1, which is
//! used by the HTTP service.
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! # use simcom_at::modem::Modem;
//! # use simcom_at::bearer::BearerConfig;
//! #
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! modem.connect_bearer(&BearerConfig::new("iot.example")).unwrap();
//! ````
use crate::commands::{
    AttachCommand, BearerControlCommand, BearerParameter, DefinePdpContextCommand, SetBearerParameterCommand,
};
use crate::error::Error;
use crate::modem::Modem;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

/// Access point configuration of the bearer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BearerConfig<'a> {
    /// Access point name
    pub apn: &'a str,

    /// User name, empty if the APN requires none
    pub user: &'a str,

    /// Password, empty if the APN requires none
    pub password: &'a str,
}

impl<'a> BearerConfig<'a> {
    /// Configuration without credentials
    pub fn new(apn: &'a str) -> Self {
        Self {
            apn,
            user: "",
            password: "",
        }
    }

    pub fn with_credentials(apn: &'a str, user: &'a str, password: &'a str) -> Self {
        Self { apn, user, password }
    }
}

/// Errors of the bearer sequence, naming the failed step
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BearerError {
    /// Error while defining the PDP context (`AT+CGDCONT`)
    ContextFailed(Error),

    /// Error while attaching to the packet domain (`AT+CGATT`)
    AttachFailed(Error),

    /// Error while setting the bearer APN
    ApnFailed(Error),

    /// Error while setting the bearer user name
    UserFailed(Error),

    /// Error while setting the bearer password
    PasswordFailed(Error),

    /// Error while opening the bearer
    OpenFailed(Error),

    /// Error while closing the bearer
    CloseFailed(Error),
}

impl BearerError {
    /// Engine error of the failed step
    pub fn cause(&self) -> Error {
        match self {
            BearerError::ContextFailed(error)
            | BearerError::AttachFailed(error)
            | BearerError::ApnFailed(error)
            | BearerError::UserFailed(error)
            | BearerError::PasswordFailed(error)
            | BearerError::OpenFailed(error)
            | BearerError::CloseFailed(error) => *error,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BearerError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BearerError::ContextFailed(e) => defmt::write!(f, "BearerError::ContextFailed({})", e),
            BearerError::AttachFailed(e) => defmt::write!(f, "BearerError::AttachFailed({})", e),
            BearerError::ApnFailed(e) => defmt::write!(f, "BearerError::ApnFailed({})", e),
            BearerError::UserFailed(e) => defmt::write!(f, "BearerError::UserFailed({})", e),
            BearerError::PasswordFailed(e) => defmt::write!(f, "BearerError::PasswordFailed({})", e),
            BearerError::OpenFailed(e) => defmt::write!(f, "BearerError::OpenFailed({})", e),
            BearerError::CloseFailed(e) => defmt::write!(f, "BearerError::CloseFailed({})", e),
        }
    }
}

impl<S, T, PWR, RST, const TIMER_HZ: u32, const BUF_SIZE: usize> Modem<S, T, PWR, RST, TIMER_HZ, BUF_SIZE>
where
    S: Read + ReadReady + Write,
    T: Timer<TIMER_HZ>,
    PWR: OutputPin,
    RST: OutputPin,
{
    /// Configures and opens the packet data bearer
    ///
    /// Stops at the first failed step, steps already applied are not rolled back. User and password
    /// are always sent, even if empty.
    pub fn connect_bearer(&mut self, config: &BearerConfig) -> Result<(), BearerError> {
        info!("Connecting bearer, APN {}", config.apn);

        self.send_command(DefinePdpContextCommand::new(config.apn))?;
        self.send_command(AttachCommand)?;
        self.send_command(SetBearerParameterCommand::new(BearerParameter::Apn, config.apn))?;
        self.send_command(SetBearerParameterCommand::new(BearerParameter::User, config.user))?;
        self.send_command(SetBearerParameterCommand::new(BearerParameter::Password, config.password))?;
        self.send_command(BearerControlCommand::open())?;

        debug!("Bearer opened");
        Ok(())
    }

    /// Closes the packet data bearer
    pub fn close_bearer(&mut self) -> Result<(), BearerError> {
        self.send_command(BearerControlCommand::close())
    }
}
