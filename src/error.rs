//! Error types for the webhook chat client.
//!
//! Every failure the client can observe is represented by [`Error`].  The
//! user never sees these values directly: [`Error::category`] folds them into
//! the small [`ErrorCategory`] taxonomy that drives the localized apology shown
//! in the chat.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The main error type for the webhook chat client.
#[derive(Clone, Debug)]
pub enum Error {
    /// The backend answered with an unsuccessful HTTP status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Body text or reason phrase returned with the status.
        message: String,
    },

    /// The chat endpoint does not exist (HTTP 404).
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The proxy could not reach the automation webhook (HTTP 502).
    BadGateway {
        /// Human-readable error message.
        message: String,
    },

    /// The request was rejected as cross-origin.
    Cors {
        /// Human-readable error message.
        message: String,
    },

    /// A single attempt exceeded its time budget.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// The backend could not be reached at all.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error that is neither a timeout nor a connection failure.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A message or attachment failed validation before dispatch.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Error::BadGateway {
            message: message.into(),
        }
    }

    /// Creates a new cross-origin rejection error.
    pub fn cors(message: impl Into<String>) -> Self {
        Error::Cors {
            message: message.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this error is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::NotFound { .. } => Some(404),
            Error::BadGateway { .. } => Some(502),
            _ => None,
        }
    }

    /// Folds this error into the user-facing failure taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Timeout { .. } => ErrorCategory::Timeout,
            Error::Connection { .. } => ErrorCategory::NetworkError,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::BadGateway { .. } => ErrorCategory::GatewayUnavailable,
            Error::Cors { .. } => ErrorCategory::Cors,
            Error::Api {
                status_code,
                message,
            } => match status_code {
                404 => ErrorCategory::NotFound,
                502 => ErrorCategory::GatewayUnavailable,
                _ if message.contains("Bad Gateway") => ErrorCategory::GatewayUnavailable,
                _ if message.contains("CORS") => ErrorCategory::Cors,
                _ => ErrorCategory::Generic,
            },
            _ => ErrorCategory::Generic,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                status_code,
                message,
            } => {
                write!(f, "HTTP error {status_code}: {message}")
            }
            Error::NotFound { message } => {
                write!(f, "HTTP error 404: {message}")
            }
            Error::BadGateway { message } => {
                write!(f, "HTTP error 502 Bad Gateway: {message}")
            }
            Error::Cors { message } => {
                write!(f, "CORS rejection: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Request timed out: {message} ({duration} seconds)")
                } else {
                    write!(f, "Request timed out: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Network connectivity issue: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for webhook chat operations.
pub type Result<T> = std::result::Result<T, Error>;

/////////////////////////////////////////// ErrorCategory //////////////////////////////////////////

/// The user-facing failure taxonomy of a submission.
///
/// Each category maps to one localized message; see [`crate::Catalog::failure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Every attempt ran out of time.
    Timeout,
    /// The backend could not be reached.
    NetworkError,
    /// The chat endpoint is not deployed.
    NotFound,
    /// The proxy is up but the webhook behind it is not.
    GatewayUnavailable,
    /// Cross-origin rejection.
    Cors,
    /// Anything else.
    Generic,
}

impl ErrorCategory {
    /// Returns the wire/diagnostic name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::NetworkError => "network_error",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::GatewayUnavailable => "gateway_unavailable",
            ErrorCategory::Cors => "cors",
            ErrorCategory::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_status() {
        assert_eq!(Error::not_found("gone").category(), ErrorCategory::NotFound);
        assert_eq!(
            Error::bad_gateway("n8n down").category(),
            ErrorCategory::GatewayUnavailable
        );
        assert_eq!(Error::api(404, "x").category(), ErrorCategory::NotFound);
        assert_eq!(
            Error::api(502, "x").category(),
            ErrorCategory::GatewayUnavailable
        );
        assert_eq!(Error::api(500, "boom").category(), ErrorCategory::Generic);
        assert_eq!(Error::api(503, "nope").category(), ErrorCategory::Generic);
    }

    #[test]
    fn categories_follow_body_text() {
        assert_eq!(
            Error::api(500, "upstream said Bad Gateway").category(),
            ErrorCategory::GatewayUnavailable
        );
        assert_eq!(
            Error::api(403, "blocked by CORS policy").category(),
            ErrorCategory::Cors
        );
    }

    #[test]
    fn transport_failures() {
        assert_eq!(
            Error::timeout("slow", Some(10.0)).category(),
            ErrorCategory::Timeout
        );
        assert_eq!(
            Error::connection("refused", None).category(),
            ErrorCategory::NetworkError
        );
        assert_eq!(
            Error::http_client("weird", None).category(),
            ErrorCategory::Generic
        );
        assert_eq!(
            Error::validation("empty", None).category(),
            ErrorCategory::Generic
        );
    }

    #[test]
    fn display_carries_status() {
        let err = Error::api(500, "Internal Server Error");
        assert_eq!(err.to_string(), "HTTP error 500: Internal Server Error");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(Error::not_found("x").status_code(), Some(404));
        assert_eq!(Error::cors("x").status_code(), None);
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing.png").into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn category_names() {
        assert_eq!(ErrorCategory::NetworkError.to_string(), "network_error");
        assert_eq!(
            serde_json::to_string(&ErrorCategory::GatewayUnavailable).unwrap(),
            "\"gateway_unavailable\""
        );
    }
}
