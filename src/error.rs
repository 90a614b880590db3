use embedded_io::ErrorKind;

/// Errors of the command engine and the command library
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No byte (or no expected terminator) was received within the timeout
    Timeout,

    /// Received byte differs from the byte the protocol requires at this position
    Mismatch {
        /// Byte the protocol expected
        expected: u8,
        /// Byte actually received (and consumed)
        received: u8,
    },

    /// Captured payload failed positional validation, e.g. wrong prefix or missing delimiter
    Format,

    /// Modem answered with an error result code, e.g. `ERROR` or `+CME ERROR: <text>`
    Rejected,

    /// Requested length or command text does not fit into the available buffer
    Capacity,

    /// Upstream serial error
    Serial(ErrorKind),

    /// Upstream timer error
    Timer,

    /// Upstream GPIO error while driving the power or reset line
    Pin,
}

impl Error {
    /// Returns true if the error was caused by the modem's answer (or absence of it) rather than by
    /// a local peripheral fault. Such commands may succeed when simply issued again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Timeout | Error::Mismatch { .. } | Error::Format | Error::Rejected
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Timeout => write!(f, "timeout"),
            Error::Mismatch { expected, received } => {
                write!(f, "expected byte 0x{:02x}, received 0x{:02x}", expected, received)
            }
            Error::Format => write!(f, "malformed response"),
            Error::Rejected => write!(f, "command rejected by modem"),
            Error::Capacity => write!(f, "buffer capacity exceeded"),
            Error::Serial(kind) => write!(f, "serial error: {:?}", kind),
            Error::Timer => write!(f, "timer error"),
            Error::Pin => write!(f, "pin error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Timeout => defmt::write!(f, "Error::Timeout"),
            Error::Mismatch { expected, received } => {
                defmt::write!(f, "Error::Mismatch({=u8:#x}, {=u8:#x})", expected, received)
            }
            Error::Format => defmt::write!(f, "Error::Format"),
            Error::Rejected => defmt::write!(f, "Error::Rejected"),
            Error::Capacity => defmt::write!(f, "Error::Capacity"),
            Error::Serial(kind) => defmt::write!(f, "Error::Serial({})", kind),
            Error::Timer => defmt::write!(f, "Error::Timer"),
            Error::Pin => defmt::write!(f, "Error::Pin"),
        }
    }
}

/// Maps an upstream serial error
pub(crate) fn serial_error<E: embedded_io::Error>(error: E) -> Error {
    Error::Serial(error.kind())
}
