//! Connection health as last observed by the client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Outcome of the most recent request attempt.
///
/// Updated after every attempt and reported in diagnostics and outbound
/// payloads.  It never gates whether a request is made.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No attempt has completed yet.
    #[default]
    Unknown,
    /// The last attempt got a successful response.
    Connected,
    /// The last attempt could not reach the backend.
    NetworkError,
    /// The last attempt ran out of time.
    Timeout,
    /// The last attempt failed for any other reason.
    Error,
}

impl ConnectionState {
    /// Returns the wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Unknown => "unknown",
            ConnectionState::Connected => "connected",
            ConnectionState::NetworkError => "network_error",
            ConnectionState::Timeout => "timeout",
            ConnectionState::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Error> for ConnectionState {
    fn from(err: &Error) -> Self {
        match err {
            Error::Timeout { .. } => ConnectionState::Timeout,
            Error::Connection { .. } => ConnectionState::NetworkError,
            _ => ConnectionState::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_error() {
        assert_eq!(
            ConnectionState::from(&Error::timeout("t", None)),
            ConnectionState::Timeout
        );
        assert_eq!(
            ConnectionState::from(&Error::connection("c", None)),
            ConnectionState::NetworkError
        );
        assert_eq!(
            ConnectionState::from(&Error::not_found("n")),
            ConnectionState::Error
        );
    }

    #[test]
    fn wire_names() {
        assert_eq!(ConnectionState::default().as_str(), "unknown");
        assert_eq!(
            serde_json::to_string(&ConnectionState::NetworkError).unwrap(),
            "\"network_error\""
        );
    }
}
