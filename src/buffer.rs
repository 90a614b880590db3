use crate::error::Error;
use core::ffi::CStr;

/// Fixed capacity buffer for staging captured response payloads
///
/// The cursor marks the next write position and never exceeds the capacity. Every capture starts
/// over at position zero, so the content is valid just until the next command.
pub(crate) struct ResponseBuffer<const N: usize> {
    bytes: [u8; N],

    /// Next buffer index to insert data
    cursor: usize,
}

impl<const N: usize> ResponseBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0x0; N],
            cursor: 0,
        }
    }

    /// Resets the cursor to the buffer start
    pub fn clear(&mut self) {
        self.cursor = 0;
    }

    /// Appends a single byte, fails if the buffer is full
    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        if self.cursor >= N {
            return Err(Error::Capacity);
        }

        self.bytes[self.cursor] = byte;
        self.cursor += 1;
        Ok(())
    }

    /// Max. length of a text payload. One byte stays reserved for the terminating NUL.
    pub const fn text_capacity(&self) -> usize {
        N.saturating_sub(1)
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the current fill length
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.cursor]
    }

    /// Writes the NUL marker at the cursor position. The cursor itself stays unchanged.
    fn terminate(&mut self) -> Result<(), Error> {
        if self.cursor >= N {
            return Err(Error::Capacity);
        }

        self.bytes[self.cursor] = 0x0;
        Ok(())
    }
}

/// Borrowed view on a captured response payload
///
/// The view borrows the driver, so it can't outlive the next command.
pub struct Response<'a, const N: usize> {
    buffer: &'a mut ResponseBuffer<N>,
}

impl<'a, const N: usize> Response<'a, N> {
    pub(crate) fn new(buffer: &'a mut ResponseBuffer<N>) -> Self {
        Self { buffer }
    }

    /// Captured payload, line terminators excluded
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Returns the payload as text, fails if the payload is not valid UTF-8
    pub fn as_str(&self) -> Result<&str, Error> {
        core::str::from_utf8(self.buffer.as_slice()).map_err(|_| Error::Format)
    }

    /// Consumes the view and returns the payload bytes with the full borrow lifetime
    pub fn into_bytes(self) -> &'a [u8] {
        let buffer = self.buffer;
        buffer.as_slice()
    }

    /// Consumes the view and returns the payload as text with the full borrow lifetime
    pub fn into_str(self) -> Result<&'a str, Error> {
        let buffer = self.buffer;
        core::str::from_utf8(buffer.as_slice()).map_err(|_| Error::Format)
    }

    /// Appends the NUL terminator and returns the payload as C string.
    ///
    /// Fails with [Error::Capacity] if the payload occupies the whole buffer (only possible for
    /// fixed length captures of exactly the buffer capacity) and with [Error::Format] if the
    /// payload itself contains a NUL byte.
    pub fn into_c_str(self) -> Result<&'a CStr, Error> {
        let buffer = self.buffer;
        buffer.terminate()?;

        let length = buffer.len();
        CStr::from_bytes_with_nul(&buffer.bytes[..=length]).map_err(|_| Error::Format)
    }
}
