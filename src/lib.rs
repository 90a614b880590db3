//! # SIMCom SIM7000 AT driver
//!
//! Blocking, allocation free driver for SIM7000 cellular modems. The driver talks to the modem over
//! any byte channel implementing the [embedded_io] traits, measures timeouts with a
//! [fugit_timer::Timer] and drives the `PWRKEY` and `RESET` lines with [embedded_hal] output pins.
//!
//! The crate is layered:
//! * [transport]: timed byte receiver and the CRLF line protocol
//! * [engine]: command engine capturing responses into a fixed capacity buffer
//! * [modem], [network], [gnss], [bearer], [http]: command library on top of the engine
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! use simcom_at::modem::{Modem, PowerState};
//!
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! modem.init().unwrap();
//! assert_eq!(PowerState::Ready, modem.state());
//! ````
#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

// Declared first, so the logging macros are visible in all other modules
pub(crate) mod fmt;

pub mod bearer;
pub(crate) mod buffer;
pub mod commands;
pub mod engine;
pub mod error;
pub mod gnss;
pub mod http;
pub mod modem;
pub mod network;
pub mod responses;
pub mod timing;
pub mod transport;

#[cfg(feature = "examples")]
pub mod example;

pub use buffer::Response;
pub use error::Error;

#[cfg(test)]
mod tests;
