//! # HTTP client
//!
//! Posts a request body over the bearer opened by [Modem::connect_bearer]. The modem executes the
//! request on its own and reports the result by an unsolicited `+HTTPACTION` line, which is awaited
//! before the HTTP service gets terminated.
//!
//! ````
//! # use simcom_at::example::{ExamplePin, ExampleSerial, ExampleTimer};
//! # use simcom_at::modem::Modem;
//! # use simcom_at::http::HttpRequest;
//! #
//! let mut modem: Modem<_, _, _, _, 1_000> =
//!     Modem::new(ExampleSerial::default(), ExampleTimer::default(), ExamplePin, ExamplePin);
//!
//! let request = HttpRequest::post("http://example.org/telemetry", b"{\"temperature\": 3.14}")
//!     .content_type("application/json");
//!
//! let response = modem.http_post(&request).unwrap();
//! assert_eq!(200, response.status);
//! ````
use crate::commands::{
    HttpActionCommand, HttpDataCommand, HttpInitCommand, HttpMethod, HttpParameterCommand, HttpTermCommand,
};
use crate::engine::OK;
use crate::error::Error;
use crate::modem::Modem;
use crate::responses::HttpResponse;
use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

/// Status code a successful request must answer with
pub const HTTP_OK: u16 = 200;

/// Default time in ms the modem waits for the request body
pub const DEFAULT_UPLOAD_BUDGET_MS: u32 = 3_000;

/// Default time in ms the modem gets to execute the request
pub const DEFAULT_ACTION_TIMEOUT_MS: u32 = 2_000;

/// Time in ms on top of the upload budget until the upload gets acknowledged
const UPLOAD_MARGIN_MS: u32 = 3_000;

/// Bearer profile used for HTTP requests
const BEARER_CID: u8 = 1;

/// HTTP POST request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest<'a> {
    /// Request URL, e.g. `http://example.org/telemetry`
    pub url: &'a str,

    /// Content type of the body. The modem default is used if None.
    pub content_type: Option<&'a str>,

    /// Request body
    pub payload: &'a [u8],

    /// Max. time in ms the modem waits for the body
    pub upload_budget_ms: u32,

    /// Max. time in ms until the modem reports the request result
    pub action_timeout_ms: u32,
}

impl<'a> HttpRequest<'a> {
    pub fn post(url: &'a str, payload: &'a [u8]) -> Self {
        Self {
            url,
            content_type: None,
            payload,
            upload_budget_ms: DEFAULT_UPLOAD_BUDGET_MS,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
        }
    }

    pub fn content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn upload_budget_ms(mut self, budget: u32) -> Self {
        self.upload_budget_ms = budget;
        self
    }

    pub fn action_timeout_ms(mut self, timeout: u32) -> Self {
        self.action_timeout_ms = timeout;
        self
    }
}

/// Errors of the HTTP sequence, naming the failed step
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HttpError {
    /// Error while initializing the HTTP service
    InitFailed(Error),

    /// Error while setting a session parameter
    ParameterFailed(Error),

    /// Modem didn't prompt for the request body
    DataFailed(Error),

    /// Error while uploading the request body
    UploadFailed(Error),

    /// Modem didn't accept the action command
    ActionFailed(Error),

    /// Request result was not received or malformed
    ResultFailed(Error),

    /// Server answered with a status other than 200
    UnexpectedStatus(u16),

    /// Error while terminating the HTTP service
    TerminateFailed(Error),
}

#[cfg(feature = "defmt")]
impl defmt::Format for HttpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HttpError::InitFailed(e) => defmt::write!(f, "HttpError::InitFailed({})", e),
            HttpError::ParameterFailed(e) => defmt::write!(f, "HttpError::ParameterFailed({})", e),
            HttpError::DataFailed(e) => defmt::write!(f, "HttpError::DataFailed({})", e),
            HttpError::UploadFailed(e) => defmt::write!(f, "HttpError::UploadFailed({})", e),
            HttpError::ActionFailed(e) => defmt::write!(f, "HttpError::ActionFailed({})", e),
            HttpError::ResultFailed(e) => defmt::write!(f, "HttpError::ResultFailed({})", e),
            HttpError::UnexpectedStatus(status) => defmt::write!(f, "HttpError::UnexpectedStatus({})", status),
            HttpError::TerminateFailed(e) => defmt::write!(f, "HttpError::TerminateFailed({})", e),
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
    /// Posts the request and returns the result reported by the modem
    ///
    /// Once the HTTP service is initialized, it gets terminated in any case. If the request failed,
    /// the error of the failed step is returned and a termination failure is only logged.
    pub fn http_post(&mut self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.send_command(HttpInitCommand)?;

        let result = self.execute_post(request);
        let terminated = self.send_command(HttpTermCommand);

        match (result, terminated) {
            (Ok(response), Ok(_)) => Ok(response),
            (Ok(_), Err(error)) => Err(error),
            (Err(error), terminated) => {
                if terminated.is_err() {
                    warn!("HTTP service not terminated after failed request");
                }
                Err(error)
            }
        }
    }

    /// Steps between init and termination
    fn execute_post(&mut self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.send_command(HttpParameterCommand::Cid(BEARER_CID))?;
        self.send_command(HttpParameterCommand::Url(request.url))?;

        if let Some(content_type) = request.content_type {
            self.send_command(HttpParameterCommand::Content(content_type))?;
        }

        let length = u32::try_from(request.payload.len()).map_err(|_| HttpError::DataFailed(Error::Capacity))?;
        self.send_command(HttpDataCommand::new(length, request.upload_budget_ms))?;

        debug!("Uploading {} bytes", length);
        self.engine.write_raw(request.payload).map_err(HttpError::UploadFailed)?;
        self.engine
            .confirm_response(OK, request.upload_budget_ms.saturating_add(UPLOAD_MARGIN_MS))
            .map_err(HttpError::UploadFailed)?;

        self.send_command(HttpActionCommand::post())?;

        let line = self
            .engine
            .capture_variable_length(request.action_timeout_ms)
            .map_err(HttpError::ResultFailed)?;
        let response = HttpResponse::parse(line.as_bytes()).map_err(HttpError::ResultFailed)?;

        // Result of another request, e.g. a late line of a previous session
        if response.method != HttpMethod::Post as u8 {
            warn!("Unexpected HTTP method {} in action result", response.method);
            return Err(HttpError::ResultFailed(Error::Format));
        }

        info!("HTTP request finished with status {}", response.status);

        if response.status != HTTP_OK {
            return Err(HttpError::UnexpectedStatus(response.status));
        }

        Ok(response)
    }
}
