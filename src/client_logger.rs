//! Logging trait for chat client exchanges.
//!
//! This module provides the [`ExchangeLogger`] trait that allows users to
//! capture every request the [`ChatClient`](crate::ChatClient) sends and what
//! came back, independent of what the user is shown.

use crate::error::Error;
use crate::message::ChatRequest;
use crate::transport::RawResponse;

/// A trait for logging chat client exchanges.
///
/// # Example
///
/// ```rust,ignore
/// use webhook_chat::{ChatRequest, Error, ExchangeLogger, RawResponse};
///
/// struct Stderr;
///
/// impl ExchangeLogger for Stderr {
///     fn log_request(&self, request: &ChatRequest) {
///         eprintln!("-> {}", serde_json::to_string(request.payload()).unwrap());
///     }
///
///     fn log_response(&self, response: &RawResponse) {
///         eprintln!("<- {} {}", response.status, response.body);
///     }
///
///     fn log_failure(&self, error: &Error) {
///         eprintln!("!! {error}");
///     }
/// }
/// ```
pub trait ExchangeLogger: Send + Sync {
    /// Log a request before its first attempt.
    fn log_request(&self, request: &ChatRequest);

    /// Log the raw response of the attempt that succeeded.
    fn log_response(&self, response: &RawResponse);

    /// Log the terminal error once all attempts failed.
    fn log_failure(&self, error: &Error);
}
