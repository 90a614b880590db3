//! # Timed receiver and line protocol
//!
//! Byte level primitives on top of a non-blocking serial channel. Every receive operation
//! busy-polls the channel and the timer until a byte arrives or the deadline expires, so no
//! operation blocks longer than its timeout.
//!
//! Responses are framed as `CRLF <payload> CRLF`. The first CR of a response is awaited with a
//! caller supplied timeout, as the modem may need a while to start answering. Every following byte
//! must arrive within [CHARACTER_TIMEOUT_MS], otherwise the exchange is considered dead.
use crate::error::{serial_error, Error};
use embedded_io::{Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Timeout in milliseconds applied to every byte after the first one of a response
pub const CHARACTER_TIMEOUT_MS: u32 = 100;

/// Time in milliseconds a slow UART gets to re-assert "data ready" while flushing stale input
pub(crate) const FLUSH_GRACE_MS: u32 = 2;

/// Upper bound in milliseconds for flushing stale input, so a chattering line can't stall a command
pub(crate) const FLUSH_TIMEOUT_MS: u32 = 500;

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';

/// Result of waiting for a specific byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ByteOutcome {
    /// The expected byte was received
    Match,

    /// A different byte was received. The byte was consumed.
    Mismatch(u8),

    /// No byte arrived within the timeout
    Timeout,
}

impl ByteOutcome {
    /// Converts the outcome to a result, expected byte is used for error reporting
    pub(crate) fn into_result(self, expected: u8) -> Result<(), Error> {
        match self {
            ByteOutcome::Match => Ok(()),
            ByteOutcome::Mismatch(received) => Err(Error::Mismatch { expected, received }),
            ByteOutcome::Timeout => Err(Error::Timeout),
        }
    }
}

/// Point in time after which a blocking wait gives up
#[derive(Copy, Clone, Debug)]
pub(crate) struct Deadline<const TIMER_HZ: u32> {
    instant: TimerInstantU32<TIMER_HZ>,
}

impl<const TIMER_HZ: u32> Deadline<TIMER_HZ> {
    /// Starts a new deadline expiring `timeout_ms` from now
    pub(crate) fn start<T: Timer<TIMER_HZ>>(timer: &mut T, timeout_ms: u32) -> Self {
        Self {
            instant: timer.now() + TimerDurationU32::<TIMER_HZ>::millis(timeout_ms),
        }
    }

    pub(crate) fn is_expired<T: Timer<TIMER_HZ>>(&self, timer: &mut T) -> bool {
        timer.now() >= self.instant
    }
}

/// Serial channel + clock
pub struct Transport<S, T, const TIMER_HZ: u32> {
    /// Serial byte channel to the modem
    pub(crate) serial: S,

    /// Timer used for timeout measurement
    pub(crate) timer: T,
}

impl<S, T, const TIMER_HZ: u32> Transport<S, T, TIMER_HZ>
where
    S: Read + ReadReady + Write,
    T: Timer<TIMER_HZ>,
{
    pub fn new(serial: S, timer: T) -> Self {
        Self { serial, timer }
    }

    /// Returns a byte if one is pending, never blocks
    fn try_receive_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.serial.read_ready().map_err(serial_error)? {
            return Ok(None);
        }

        let mut byte = [0x0; 1];
        match self.serial.read(&mut byte).map_err(serial_error)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Waits for any byte. Returns None if no byte arrived within the timeout.
    pub fn receive_byte(&mut self, timeout_ms: u32) -> Result<Option<u8>, Error> {
        let deadline = Deadline::start(&mut self.timer, timeout_ms);

        loop {
            if let Some(byte) = self.try_receive_byte()? {
                return Ok(Some(byte));
            }

            if deadline.is_expired(&mut self.timer) {
                return Ok(None);
            }
        }
    }

    /// Waits for the given byte. A received byte is consumed, even if it doesn't match.
    pub fn wait_for_byte(&mut self, expected: u8, timeout_ms: u32) -> Result<ByteOutcome, Error> {
        Ok(match self.receive_byte(timeout_ms)? {
            Some(byte) if byte == expected => ByteOutcome::Match,
            Some(byte) => ByteOutcome::Mismatch(byte),
            None => ByteOutcome::Timeout,
        })
    }

    /// Same as [Self::wait_for_byte], but mismatch and timeout are mapped to errors
    pub(crate) fn expect_byte(&mut self, expected: u8, timeout_ms: u32) -> Result<(), Error> {
        self.wait_for_byte(expected, timeout_ms)?.into_result(expected)
    }

    /// Discards all pending input. Returns the number of discarded bytes.
    pub fn flush_input(&mut self) -> Result<usize, Error> {
        let deadline = Deadline::start(&mut self.timer, FLUSH_TIMEOUT_MS);
        let mut count = 0;

        while let Some(byte) = self.receive_byte(FLUSH_GRACE_MS)? {
            trace!("Discarding stale byte {:?}", byte);
            count += 1;

            if deadline.is_expired(&mut self.timer) {
                warn!("Input still pending after flushing {} bytes", count);
                break;
            }
        }

        Ok(count)
    }

    /// Writes the given bytes as they are, without any line terminator
    pub fn write_raw(&mut self, data: &[u8]) -> Result<(), Error> {
        self.serial.write_all(data).map_err(serial_error)?;
        self.serial.flush().map_err(serial_error)
    }

    /// Flushes stale input and sends the command followed by CRLF
    pub fn send_command(&mut self, command: &str) -> Result<(), Error> {
        self.flush_input()?;
        debug!("Sending command {}", command);

        self.write_raw(command.as_bytes())?;
        self.write_raw(&[CR, LF])
    }

    /// Awaits the opening CRLF of a response, CR within the given timeout
    pub(crate) fn expect_line_start(&mut self, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.expect_byte(CR, first_byte_timeout_ms)?;
        self.expect_byte(LF, CHARACTER_TIMEOUT_MS)
    }

    /// Awaits the closing CRLF of a response
    pub(crate) fn expect_line_end(&mut self) -> Result<(), Error> {
        self.expect_byte(CR, CHARACTER_TIMEOUT_MS)?;
        self.expect_byte(LF, CHARACTER_TIMEOUT_MS)
    }

    /// Expects a response line of exactly `CRLF <literal> CRLF`
    pub fn confirm_response(&mut self, literal: &str, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.expect_line_start(first_byte_timeout_ms)?;

        for byte in literal.bytes() {
            self.expect_byte(byte, CHARACTER_TIMEOUT_MS)?;
        }

        self.expect_line_end()
    }

    /// Sends the command and expects the given literal response
    pub fn send_and_confirm(&mut self, command: &str, literal: &str, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.send_command(command)?;
        self.confirm_response(literal, first_byte_timeout_ms)
    }
}
