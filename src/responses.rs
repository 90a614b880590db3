//! # Response formats
//!
//! Positional layouts of the query responses and the typed values extracted from them. All parsers
//! work on the captured payload only (line terminators excluded), so they can be tested without a
//! transport.
use crate::error::Error;
use heapless::String;

/// Length of an IMEI, digits only
pub const IMEI_LEN: usize = 15;

/// Length of an IMSI, digits only
pub const IMSI_LEN: usize = 15;

/// Length of the firmware revision, e.g. `Revision:1351B04SIM7000G`
pub const FIRMWARE_VERSION_LEN: usize = 24;

/// International mobile equipment identity
pub type Imei = String<IMEI_LEN>;

/// International mobile subscriber identity
pub type Imsi = String<IMSI_LEN>;

/// Firmware revision string
pub type FirmwareVersion = String<FIRMWARE_VERSION_LEN>;

/// Layout of a fixed length response carrying a single digit value, e.g. `+CGREG: 0,5`
#[derive(Copy, Clone, Debug)]
pub(crate) struct DigitFormat {
    /// Query command
    pub command: &'static str,

    /// Total payload length
    pub length: usize,

    /// Expected payload start
    pub prefix: &'static [u8],

    /// Offset of the mandatory `,` delimiter, if any
    pub delimiter: Option<usize>,

    /// Offset of the value digit
    pub value: usize,
}

/// `+CGREG: <n>,<stat>`
pub(crate) const REGISTRATION_FORMAT: DigitFormat = DigitFormat {
    command: "AT+CGREG?",
    length: 11,
    prefix: b"+CGREG: ",
    delimiter: Some(9),
    value: 10,
};

/// `+CNSMOD: <n>,<stat>`
pub(crate) const SYSTEM_MODE_FORMAT: DigitFormat = DigitFormat {
    command: "AT+CNSMOD?",
    length: 12,
    prefix: b"+CNSMOD: ",
    delimiter: Some(10),
    value: 11,
};

/// `+CFUN: <fun>`
pub(crate) const FUNCTIONALITY_FORMAT: DigitFormat = DigitFormat {
    command: "AT+CFUN?",
    length: 8,
    prefix: b"+CFUN: ",
    delimiter: None,
    value: 7,
};

impl DigitFormat {
    /// Validates the layout and returns the value digit
    pub fn parse(&self, data: &[u8]) -> Result<u8, Error> {
        if data.len() != self.length || !data.starts_with(self.prefix) {
            return Err(Error::Format);
        }

        if let Some(delimiter) = self.delimiter {
            if data[delimiter] != b',' {
                return Err(Error::Format);
            }
        }

        let digit = data[self.value];
        if !digit.is_ascii_digit() {
            return Err(Error::Format);
        }

        Ok(digit - b'0')
    }
}

/// Query command of the signal quality
pub(crate) const SIGNAL_QUALITY_COMMAND: &str = "AT+CSQ";

/// Expected start of the signal quality response
pub(crate) const SIGNAL_QUALITY_PREFIX: &[u8] = b"+CSQ:";

/// Max. payload length of `+CSQ: <rssi>,<ber>`
pub(crate) const SIGNAL_QUALITY_MAX_LEN: usize = 11;

/// Parses leading decimal digits, stops at the first non-digit. At least one digit is required.
pub(crate) fn parse_decimal(data: &[u8]) -> Option<u32> {
    let mut value: u32 = 0;
    let mut digits = 0;

    for byte in data.iter().take_while(|byte| byte.is_ascii_digit()) {
        value = value.checked_mul(10)?.checked_add((byte - b'0') as u32)?;
        digits += 1;
    }

    if digits == 0 {
        return None;
    }

    Some(value)
}

/// Parses a field consisting of decimal digits only
fn parse_number(field: &[u8]) -> Result<u32, Error> {
    if !field.iter().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::Format);
    }

    parse_decimal(field).ok_or(Error::Format)
}

/// Strips leading spaces
fn trim_start(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|byte| *byte != b' ').unwrap_or(data.len());
    &data[start..]
}

/// Received signal strength and channel bit error rate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalQuality {
    /// RSSI index, 0..=31 or 99 if not known
    pub rssi: u8,

    /// Bit error rate index, 0..=7 or 99 if not known
    pub ber: u8,
}

impl SignalQuality {
    /// Parses `+CSQ: <rssi>,<ber>`. The space after the colon is optional.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.len() > SIGNAL_QUALITY_MAX_LEN {
            return Err(Error::Format);
        }

        let values = data.strip_prefix(SIGNAL_QUALITY_PREFIX).ok_or(Error::Format)?;
        let values = trim_start(values);
        let delimiter = values.iter().position(|byte| *byte == b',').ok_or(Error::Format)?;

        let rssi = parse_number(&values[..delimiter])?;
        let ber = parse_number(&values[delimiter + 1..])?;

        Ok(Self {
            rssi: u8::try_from(rssi).map_err(|_| Error::Format)?,
            ber: u8::try_from(ber).map_err(|_| Error::Format)?,
        })
    }

    /// Returns false if the modem reports the signal strength as not known or not detectable
    pub fn is_known(&self) -> bool {
        self.rssi <= 31
    }

    /// RSSI in dBm, from -113 dBm (index 0) up to -51 dBm (index 31)
    pub fn rssi_dbm(&self) -> Option<i16> {
        if !self.is_known() {
            return None;
        }

        Some(-113 + 2 * self.rssi as i16)
    }
}

/// Packet domain network registration status
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Not registered, not searching
    NotRegistered,

    /// Registered to the home network
    RegisteredHome,

    /// Not registered, searching for an operator
    Searching,

    /// Registration was denied
    Denied,

    /// Unknown, e.g. out of coverage
    Unknown,

    /// Registered to a foreign network
    RegisteredRoaming,
}

impl From<u8> for RegistrationStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::RegisteredHome,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            5 => RegistrationStatus::RegisteredRoaming,
            _ => RegistrationStatus::Unknown,
        }
    }
}

impl RegistrationStatus {
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming
        )
    }
}

/// Current radio access technology
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SystemMode {
    NoService,
    Gsm,
    Gprs,
    Egprs,
    LteM1,
    NbIot,

    /// Code not known by this driver
    Other(u8),
}

impl From<u8> for SystemMode {
    fn from(code: u8) -> Self {
        match code {
            0 => SystemMode::NoService,
            1 => SystemMode::Gsm,
            2 => SystemMode::Gprs,
            3 => SystemMode::Egprs,
            7 => SystemMode::LteM1,
            9 => SystemMode::NbIot,
            other => SystemMode::Other(other),
        }
    }
}

/// Phone functionality level
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Functionality {
    /// RF and SIM disabled
    Minimum,

    /// Full functionality
    Full,

    /// RF transmit and receive disabled (flight mode)
    RfDisabled,

    /// Code not known by this driver
    Other(u8),
}

impl From<u8> for Functionality {
    fn from(code: u8) -> Self {
        match code {
            0 => Functionality::Minimum,
            1 => Functionality::Full,
            4 => Functionality::RfDisabled,
            other => Functionality::Other(other),
        }
    }
}

/// Query command of the GNSS navigation information
pub(crate) const NAVIGATION_COMMAND: &str = "AT+CGNSINF";

/// Expected start of the navigation information
const NAVIGATION_PREFIX: &str = "+CGNSINF:";

/// GNSS navigation information, comma separated fields as reported by the modem
///
/// The text borrows the driver and is valid until the next command.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NavigationInfo<'a> {
    raw: &'a str,
}

impl<'a> NavigationInfo<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Whole response line, e.g. `+CGNSINF: 1,1,20240512093015.000,52.520008,13.404954,...`
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Returns the field with the given zero based index. Empty fields are returned as None.
    pub fn field(&self, index: usize) -> Option<&'a str> {
        let values = self.raw.strip_prefix(NAVIGATION_PREFIX)?.trim_start();
        values.split(',').nth(index).filter(|field| !field.is_empty())
    }

    /// True if the GNSS engine is running
    pub fn is_running(&self) -> bool {
        self.field(0) == Some("1")
    }

    /// True if a position fix is available
    pub fn has_fix(&self) -> bool {
        self.field(1) == Some("1")
    }

    /// UTC date and time, `yyyyMMddhhmmss.sss`
    pub fn utc(&self) -> Option<&'a str> {
        self.field(2)
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> Option<f32> {
        self.field(3)?.parse().ok()
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> Option<f32> {
        self.field(4)?.parse().ok()
    }

    /// MSL altitude in meters
    pub fn altitude(&self) -> Option<f32> {
        self.field(5)?.parse().ok()
    }

    /// Speed over ground in km/h
    pub fn speed(&self) -> Option<f32> {
        self.field(6)?.parse().ok()
    }

    /// Course over ground in degrees
    pub fn course(&self) -> Option<f32> {
        self.field(7)?.parse().ok()
    }
}

/// Expected start of the unsolicited HTTP action result
const HTTP_ACTION_PREFIX: &[u8] = b"+HTTPACTION: ";

/// Result of a HTTP request as reported by `+HTTPACTION: <method>,<status>,<length>`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP method code
    pub method: u8,

    /// HTTP status code
    pub status: u16,

    /// Length of the response body buffered by the modem
    pub length: u32,
}

impl HttpResponse {
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        let values = data.strip_prefix(HTTP_ACTION_PREFIX).ok_or(Error::Format)?;
        let mut fields = values.split(|byte| *byte == b',');

        let mut next = || fields.next().and_then(parse_decimal).ok_or(Error::Format);
        let method = next()?;
        let status = next()?;
        let length = next()?;

        Ok(Self {
            method: u8::try_from(method).map_err(|_| Error::Format)?,
            status: u16::try_from(status).map_err(|_| Error::Format)?,
            length,
        })
    }
}
