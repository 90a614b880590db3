//! # Command engine
//!
//! Combines the [Transport] with the response buffer into the primitive operations every modem
//! command is built from: sending a command, confirming a literal response and capturing fixed or
//! variable length payloads.
//!
//! Captured payloads are handed out as [Response] views borrowing the engine, so a payload can't be
//! read after the next command has overwritten it.
use crate::buffer::{Response, ResponseBuffer};
use crate::error::Error;
use crate::transport::{Transport, CHARACTER_TIMEOUT_MS, CR, LF};
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

/// Literal acknowledging a successful command
pub(crate) const OK: &str = "OK";

/// Result codes of a command refused by the modem
const REFUSALS: [&[u8]; 3] = [b"ERROR", b"+CME ERROR", b"+CMS ERROR"];

/// Min. length of a partial line to be recognized as start of a refusal
const REFUSAL_MIN_LEN: usize = 5;

/// Returns true if the complete line is an error result code
fn is_refusal(line: &[u8]) -> bool {
    line == REFUSALS[0] || REFUSALS[1..].iter().any(|code| line.starts_with(code))
}

/// Same as [is_refusal], but also matches the truncated start of an error result code
fn starts_refusal(partial: &[u8]) -> bool {
    is_refusal(partial)
        || (partial.len() >= REFUSAL_MIN_LEN && REFUSALS.iter().any(|code| code.starts_with(partial)))
}

/// Defines if a data response is followed by a separate `OK` line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Response consists of the data line only
    DataOnly,

    /// Data line is followed by `CRLF OK CRLF`
    DataThenOk,
}

/// Command engine owning the serial channel, the timer and the response buffer
///
/// BUF_SIZE: Capacity of the response buffer in bytes. Variable length responses may occupy at most
/// `BUF_SIZE - 1` bytes, as one byte is reserved for a terminating NUL.
pub struct Engine<S, T, const TIMER_HZ: u32, const BUF_SIZE: usize> {
    pub(crate) transport: Transport<S, T, TIMER_HZ>,

    pub(crate) buffer: ResponseBuffer<BUF_SIZE>,
}

impl<S, T, const TIMER_HZ: u32, const BUF_SIZE: usize> Engine<S, T, TIMER_HZ, BUF_SIZE>
where
    S: Read + ReadReady + Write,
    T: Timer<TIMER_HZ>,
{
    pub fn new(serial: S, timer: T) -> Self {
        Self {
            transport: Transport::new(serial, timer),
            buffer: ResponseBuffer::new(),
        }
    }

    /// Flushes stale input and sends the command followed by CRLF
    pub fn send_command(&mut self, command: &str) -> Result<(), Error> {
        self.transport.send_command(command)
    }

    /// Writes raw data without line terminator, e.g. a HTTP payload after the download prompt
    pub fn write_raw(&mut self, data: &[u8]) -> Result<(), Error> {
        self.transport.write_raw(data)
    }

    /// Expects a response line of exactly `CRLF <literal> CRLF`. The response buffer stays untouched.
    pub fn confirm_response(&mut self, literal: &str, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.transport.confirm_response(literal, first_byte_timeout_ms)
    }

    /// Sends the command and expects the given literal response
    pub fn send_and_confirm(&mut self, command: &str, literal: &str, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.transport.send_and_confirm(command, literal, first_byte_timeout_ms)
    }

    /// Captures a response line with a payload of exactly `length` bytes
    ///
    /// A line ending early fails with [Error::Format], an error result code of the modem with
    /// [Error::Rejected].
    pub fn capture_fixed_length(
        &mut self,
        length: usize,
        first_byte_timeout_ms: u32,
    ) -> Result<Response<'_, BUF_SIZE>, Error> {
        self.fill_fixed_length(length, first_byte_timeout_ms)?;
        Ok(Response::new(&mut self.buffer))
    }

    /// Captures a response line of unknown length, terminated by CRLF. An error result code of the
    /// modem fails with [Error::Rejected].
    pub fn capture_variable_length(&mut self, first_byte_timeout_ms: u32) -> Result<Response<'_, BUF_SIZE>, Error> {
        self.fill_variable_length(first_byte_timeout_ms)?;
        Ok(Response::new(&mut self.buffer))
    }

    /// Sends the command and captures a fixed length response
    pub fn query_fixed(
        &mut self,
        command: &str,
        length: usize,
        first_byte_timeout_ms: u32,
        framing: Framing,
    ) -> Result<Response<'_, BUF_SIZE>, Error> {
        self.transport.send_command(command)?;
        self.fill_fixed_length(length, first_byte_timeout_ms)?;
        self.finish(framing)?;

        Ok(Response::new(&mut self.buffer))
    }

    /// Sends the command and captures a variable length response
    pub fn query_variable(
        &mut self,
        command: &str,
        first_byte_timeout_ms: u32,
        framing: Framing,
    ) -> Result<Response<'_, BUF_SIZE>, Error> {
        self.transport.send_command(command)?;
        self.fill_variable_length(first_byte_timeout_ms)?;
        self.finish(framing)?;

        Ok(Response::new(&mut self.buffer))
    }

    /// Reads `CRLF <length bytes> CRLF` into the buffer
    fn fill_fixed_length(&mut self, length: usize, first_byte_timeout_ms: u32) -> Result<(), Error> {
        // Checked upfront, so neither the buffer nor the input gets touched
        if length > self.buffer.capacity() {
            warn!("Fixed length capture of {} bytes exceeds buffer capacity", length);
            return Err(Error::Capacity);
        }

        self.buffer.clear();
        self.transport.expect_line_start(first_byte_timeout_ms)?;

        for _ in 0..length {
            let byte = match self.transport.receive_byte(CHARACTER_TIMEOUT_MS)? {
                Some(byte) => byte,
                None => return Err(Error::Timeout),
            };

            // Line ended before the expected length
            if byte == CR {
                self.transport.expect_byte(LF, CHARACTER_TIMEOUT_MS)?;
                return Err(self.refusal_or(Error::Format));
            }

            self.buffer.push(byte)?;
        }

        self.transport.expect_line_end().map_err(|error| self.refusal_or(error))?;
        trace!("Captured {:?}", self.buffer.as_slice());
        Ok(())
    }

    /// Maps a failed fixed length capture to [Error::Rejected] if the modem answered with an error
    /// result code instead of the expected payload
    fn refusal_or(&self, error: Error) -> Error {
        if starts_refusal(self.buffer.as_slice()) {
            warn!("Command rejected by modem");
            return Error::Rejected;
        }

        error
    }

    /// Reads `CRLF <payload> CRLF` into the buffer, terminator excluded
    fn fill_variable_length(&mut self, first_byte_timeout_ms: u32) -> Result<(), Error> {
        self.buffer.clear();
        self.transport.expect_line_start(first_byte_timeout_ms)?;

        loop {
            let byte = match self.transport.receive_byte(CHARACTER_TIMEOUT_MS)? {
                Some(byte) => byte,
                None => return Err(Error::Timeout),
            };

            if byte == CR {
                self.transport.expect_byte(LF, CHARACTER_TIMEOUT_MS)?;
                break;
            }

            if self.buffer.len() >= self.buffer.text_capacity() {
                warn!("Variable length response exceeds buffer capacity");
                return Err(Error::Capacity);
            }

            self.buffer.push(byte)?;
        }

        if is_refusal(self.buffer.as_slice()) {
            warn!("Command rejected by modem");
            return Err(Error::Rejected);
        }

        trace!("Captured {:?}", self.buffer.as_slice());
        Ok(())
    }

    /// Awaits the trailing OK if required by the framing
    fn finish(&mut self, framing: Framing) -> Result<(), Error> {
        match framing {
            Framing::DataOnly => Ok(()),
            Framing::DataThenOk => self.transport.confirm_response(OK, CHARACTER_TIMEOUT_MS),
        }
    }
}
