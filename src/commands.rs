use crate::bearer::BearerError;
use crate::error::Error;
use crate::http::HttpError;
use crate::transport::CHARACTER_TIMEOUT_MS;
use heapless::String;
use numtoa::NumToA;

/// Max. length of a command line, terminator excluded
pub const COMMAND_LEN: usize = 256;

/// Encoded command line
pub type CommandText = String<COMMAND_LEN>;

/// AT command which gets acknowledged by a single literal response line
pub trait AtCommand {
    /// Literal the modem answers with on success
    const RESPONSE: &'static str = "OK";

    /// Timeout for the first byte of the response in ms
    const TIMEOUT_MS: u32 = 1_000;

    /// Encodes the command line, without CRLF
    fn write(&self, text: &mut CommandText) -> Result<(), Error>;
}

/// Trait for mapping command errors
pub trait CommandErrorHandler {
    type Error;

    /// Maps engine errors
    fn command_error(&self, error: Error) -> Self::Error;
}

/// Appends all parts to the command text
fn push_all(text: &mut CommandText, parts: &[&str]) -> Result<(), Error> {
    for part in parts {
        text.push_str(part).map_err(|_| Error::Capacity)?;
    }

    Ok(())
}

/// Appends the decimal representation of the given number
fn push_number(text: &mut CommandText, number: u32) -> Result<(), Error> {
    let mut digits = [0x0; 20];
    let digits = core::str::from_utf8(number.numtoa(10, &mut digits)).map_err(|_| Error::Format)?;
    push_all(text, &[digits])
}

/// Disables the command echo. Used as liveness probe as well.
#[derive(Clone, Default)]
pub struct EchoOffCommand;

impl AtCommand for EchoOffCommand {
    const TIMEOUT_MS: u32 = CHARACTER_TIMEOUT_MS;

    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["ATE0"])
    }
}

impl CommandErrorHandler for EchoOffCommand {
    type Error = Error;

    fn command_error(&self, error: Error) -> Self::Error {
        error
    }
}

/// Switches the GNSS engine on or off
#[derive(Clone)]
pub struct GnssPowerCommand {
    enabled: bool,
}

impl GnssPowerCommand {
    pub fn on() -> Self {
        Self { enabled: true }
    }

    pub fn off() -> Self {
        Self { enabled: false }
    }
}

impl AtCommand for GnssPowerCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+CGNSPWR=", if self.enabled { "1" } else { "0" }])
    }
}

impl CommandErrorHandler for GnssPowerCommand {
    type Error = Error;

    fn command_error(&self, error: Error) -> Self::Error {
        error
    }
}

/// Defines PDP context 1 with the given APN
#[derive(Clone)]
pub struct DefinePdpContextCommand<'a> {
    apn: &'a str,
}

impl<'a> DefinePdpContextCommand<'a> {
    pub fn new(apn: &'a str) -> Self {
        Self { apn }
    }
}

impl AtCommand for DefinePdpContextCommand<'_> {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+CGDCONT=1,\"IP\",\"", self.apn, "\""])
    }
}

impl CommandErrorHandler for DefinePdpContextCommand<'_> {
    type Error = BearerError;

    fn command_error(&self, error: Error) -> Self::Error {
        BearerError::ContextFailed(error)
    }
}

/// Attaches to the packet domain service
#[derive(Clone, Default)]
pub struct AttachCommand;

impl AtCommand for AttachCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+CGATT=1"])
    }
}

impl CommandErrorHandler for AttachCommand {
    type Error = BearerError;

    fn command_error(&self, error: Error) -> Self::Error {
        BearerError::AttachFailed(error)
    }
}

/// Bearer profile parameter tag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BearerParameter {
    Apn,
    User,
    Password,
}

impl BearerParameter {
    fn tag(&self) -> &'static str {
        match self {
            BearerParameter::Apn => "APN",
            BearerParameter::User => "USER",
            BearerParameter::Password => "PWD",
        }
    }
}

/// Sets a parameter of bearer profile 1
#[derive(Clone)]
pub struct SetBearerParameterCommand<'a> {
    parameter: BearerParameter,
    value: &'a str,
}

impl<'a> SetBearerParameterCommand<'a> {
    pub fn new(parameter: BearerParameter, value: &'a str) -> Self {
        Self { parameter, value }
    }
}

impl AtCommand for SetBearerParameterCommand<'_> {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+SAPBR=3,1,\"", self.parameter.tag(), "\",\"", self.value, "\""])
    }
}

impl CommandErrorHandler for SetBearerParameterCommand<'_> {
    type Error = BearerError;

    fn command_error(&self, error: Error) -> Self::Error {
        match self.parameter {
            BearerParameter::Apn => BearerError::ApnFailed(error),
            BearerParameter::User => BearerError::UserFailed(error),
            BearerParameter::Password => BearerError::PasswordFailed(error),
        }
    }
}

/// Opens or closes bearer profile 1
#[derive(Clone)]
pub struct BearerControlCommand {
    open: bool,
}

impl BearerControlCommand {
    pub fn open() -> Self {
        Self { open: true }
    }

    pub fn close() -> Self {
        Self { open: false }
    }
}

impl AtCommand for BearerControlCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+SAPBR=", if self.open { "1" } else { "0" }, ",1"])
    }
}

impl CommandErrorHandler for BearerControlCommand {
    type Error = BearerError;

    fn command_error(&self, error: Error) -> Self::Error {
        if self.open {
            BearerError::OpenFailed(error)
        } else {
            BearerError::CloseFailed(error)
        }
    }
}

/// Initializes the HTTP service
#[derive(Clone, Default)]
pub struct HttpInitCommand;

impl AtCommand for HttpInitCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+HTTPINIT"])
    }
}

impl CommandErrorHandler for HttpInitCommand {
    type Error = HttpError;

    fn command_error(&self, error: Error) -> Self::Error {
        HttpError::InitFailed(error)
    }
}

/// Sets a HTTP session parameter
#[derive(Clone)]
pub enum HttpParameterCommand<'a> {
    /// Bearer profile used for the session
    Cid(u8),

    /// Request URL
    Url(&'a str),

    /// Content type of the request body
    Content(&'a str),
}

impl AtCommand for HttpParameterCommand<'_> {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        match self {
            HttpParameterCommand::Cid(cid) => {
                push_all(text, &["AT+HTTPPARA=\"CID\","])?;
                push_number(text, *cid as u32)
            }
            HttpParameterCommand::Url(url) => push_all(text, &["AT+HTTPPARA=\"URL\",\"", url, "\""]),
            HttpParameterCommand::Content(content) => {
                push_all(text, &["AT+HTTPPARA=\"CONTENT\",\"", content, "\""])
            }
        }
    }
}

impl CommandErrorHandler for HttpParameterCommand<'_> {
    type Error = HttpError;

    fn command_error(&self, error: Error) -> Self::Error {
        HttpError::ParameterFailed(error)
    }
}

/// Announces the upload of a HTTP request body, answered by the `DOWNLOAD` prompt
#[derive(Clone)]
pub struct HttpDataCommand {
    /// Body length in bytes
    length: u32,

    /// Max. time in ms the modem waits for the body
    budget_ms: u32,
}

impl HttpDataCommand {
    pub fn new(length: u32, budget_ms: u32) -> Self {
        Self { length, budget_ms }
    }
}

impl AtCommand for HttpDataCommand {
    const RESPONSE: &'static str = "DOWNLOAD";
    const TIMEOUT_MS: u32 = 5_000;

    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+HTTPDATA="])?;
        push_number(text, self.length)?;
        push_all(text, &[","])?;
        push_number(text, self.budget_ms)
    }
}

impl CommandErrorHandler for HttpDataCommand {
    type Error = HttpError;

    fn command_error(&self, error: Error) -> Self::Error {
        HttpError::DataFailed(error)
    }
}

/// HTTP method codes of the action command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get = 0,
    Post = 1,
    Head = 2,
}

/// Starts the HTTP request. The result is signaled later by an unsolicited `+HTTPACTION` line.
#[derive(Clone)]
pub struct HttpActionCommand {
    method: HttpMethod,
}

impl HttpActionCommand {
    pub fn post() -> Self {
        Self {
            method: HttpMethod::Post,
        }
    }
}

impl AtCommand for HttpActionCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+HTTPACTION="])?;
        push_number(text, self.method as u32)
    }
}

impl CommandErrorHandler for HttpActionCommand {
    type Error = HttpError;

    fn command_error(&self, error: Error) -> Self::Error {
        HttpError::ActionFailed(error)
    }
}

/// Terminates the HTTP service
#[derive(Clone, Default)]
pub struct HttpTermCommand;

impl AtCommand for HttpTermCommand {
    fn write(&self, text: &mut CommandText) -> Result<(), Error> {
        push_all(text, &["AT+HTTPTERM"])
    }
}

impl CommandErrorHandler for HttpTermCommand {
    type Error = HttpError;

    fn command_error(&self, error: Error) -> Self::Error {
        HttpError::TerminateFailed(error)
    }
}
