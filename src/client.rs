//! The resilient chat client.
//!
//! A [`ChatClient`] is constructed once by whatever hosts the chat and held for
//! its lifetime.  It owns the session identity and the last observed
//! connection state; everything visual goes through the [`ChatUi`] handed to
//! each call.

use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;

use crate::chat::ChatConfig;
use crate::client_logger::ExchangeLogger;
use crate::connection::ConnectionState;
use crate::diagnostics::{DiagnosticInfo, InterferenceProbe, NoInterference, ProxyEnvProbe};
use crate::error::{Error, ErrorCategory, Result};
use crate::locale::{Catalog, Locale};
use crate::message::{AttachmentSet, OutboundMessage};
use crate::normalize::{InboundResponse, Reply, normalize};
use crate::observability::{
    HEALTH_FAILURES, HEALTH_PROBES, SUBMISSIONS, SUBMISSIONS_FAILED, SUBMISSIONS_SKIPPED,
    SUBMIT_DURATION,
};
use crate::render::{ChatUi, InputGuard, Sender};
use crate::retry::{RetryNotice, RetryObserver, RetryPolicy, dispatch_with_retry};
use crate::session::SessionId;
use crate::transport::{HttpTransport, Transport};

/// User agent reported in payloads and HTTP headers.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// What a submission left on screen as its final agent bubble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayResult {
    /// A reply from the bot (or a canned stand-in for one).
    Reply(String),
    /// A categorized apology after every attempt failed.
    Failure {
        category: ErrorCategory,
        message: String,
    },
}

impl DisplayResult {
    /// The text of the agent bubble.
    pub fn text(&self) -> &str {
        match self {
            DisplayResult::Reply(text) => text,
            DisplayResult::Failure { message, .. } => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DisplayResult::Failure { .. })
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            DisplayResult::Reply(_) => None,
            DisplayResult::Failure { category, .. } => Some(*category),
        }
    }
}

/// Client for an automation-webhook chat backend.
pub struct ChatClient<T: Transport = HttpTransport> {
    transport: T,
    session_id: SessionId,
    policy: RetryPolicy,
    locale: Locale,
    user_agent: String,
    connection: ConnectionState,
    last_error: Option<String>,
    probe: Box<dyn InterferenceProbe>,
    logger: Option<Arc<dyn ExchangeLogger>>,
}

impl ChatClient<HttpTransport> {
    /// Create a client talking HTTP to the proxy described by `config`.
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let transport = HttpTransport::with_options(
            &config.base_url,
            &config.chat_path,
            &config.health_path,
            &config.user_agent,
            config.health_timeout(),
        )?;
        Ok(Self::with_transport(transport)
            .with_policy(config.retry_policy())
            .with_locale(config.locale)
            .with_user_agent(config.user_agent.clone())
            .with_probe(Box::new(ProxyEnvProbe::new())))
    }
}

impl<T: Transport> ChatClient<T> {
    /// Create a client over an arbitrary transport with a fresh session.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            session_id: SessionId::generate(),
            policy: RetryPolicy::new(),
            locale: Locale::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connection: ConnectionState::Unknown,
            last_error: None,
            probe: Box::new(NoInterference),
            logger: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_probe(mut self, probe: Box<dyn InterferenceProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the user's text and photos and renders the outcome.
    ///
    /// Returns `None` without touching the UI or the network when there is
    /// nothing to send.  Otherwise the input controls stay disabled until the
    /// submission settles, the user's text and photos are echoed before any
    /// network activity, and exactly one agent bubble (reply or apology) is
    /// appended at the end.
    pub async fn submit(
        &mut self,
        ui: &mut dyn ChatUi,
        text: &str,
        attachments: AttachmentSet,
    ) -> Option<DisplayResult> {
        let message = match OutboundMessage::new(self.session_id.clone(), text, attachments) {
            Ok(message) => message,
            Err(err) => {
                SUBMISSIONS_SKIPPED.click();
                log::debug!("nothing to send: {err}");
                return None;
            }
        };
        SUBMISSIONS.click();
        let started = Instant::now();

        let mut ui = InputGuard::acquire(ui);
        if let Some(text) = message.text() {
            ui.append_message(Sender::User, text);
        }
        if !message.attachments().is_empty() {
            ui.append_photos(message.attachments().as_slice());
        }

        let display = match self.exchange(&mut *ui, message).await {
            Ok(text) => DisplayResult::Reply(text),
            Err(err) => self.render_failure(&mut *ui, &err),
        };
        SUBMIT_DURATION.add(started.elapsed().as_secs_f64());
        Some(display)
    }

    /// Sends an opening message without echoing it, to get the bot talking.
    ///
    /// If the backend cannot be reached a canned welcome is shown instead of
    /// an apology.
    pub async fn greet(&mut self, ui: &mut dyn ChatUi, greeting: &str) -> Option<DisplayResult> {
        let message =
            OutboundMessage::new(self.session_id.clone(), greeting, AttachmentSet::new()).ok()?;
        let mut ui = InputGuard::acquire(ui);
        match self.exchange(&mut *ui, message).await {
            Ok(text) => Some(DisplayResult::Reply(text)),
            Err(err) => {
                log::warn!("greeting failed: {err}");
                ui.clear_retry_notice();
                let welcome = self.catalog().welcome();
                ui.append_message(Sender::Agent, welcome);
                Some(DisplayResult::Reply(welcome.to_string()))
            }
        }
    }

    /// Probes the backend's health endpoint.
    pub async fn test_connection(&self) -> bool {
        HEALTH_PROBES.click();
        match self.transport.health().await {
            Ok(()) => true,
            Err(err) => {
                HEALTH_FAILURES.click();
                log::warn!("health check failed: {err}");
                false
            }
        }
    }

    /// Returns a snapshot of the client's state for troubleshooting.
    pub fn diagnostics(&self) -> DiagnosticInfo {
        DiagnosticInfo {
            session_id: self.session_id.clone(),
            connection_status: self.connection,
            last_error: self.last_error.clone(),
            user_agent: self.user_agent.clone(),
            timestamp: OffsetDateTime::now_utc(),
            interference: self.probe.suspects(),
        }
    }

    fn catalog(&self) -> Catalog {
        self.locale.catalog()
    }

    async fn exchange(&mut self, ui: &mut dyn ChatUi, message: OutboundMessage) -> Result<String> {
        ui.show_typing();
        let outcome = self.deliver(ui, message).await;
        ui.hide_typing();
        let reply = outcome?;
        let text = self.catalog().reply(&reply);
        ui.append_message(Sender::Agent, &text);
        Ok(text)
    }

    async fn deliver(&mut self, ui: &mut dyn ChatUi, message: OutboundMessage) -> Result<Reply> {
        let request = message.into_request(self.connection, &self.user_agent, OffsetDateTime::now_utc());
        log::debug!(
            "submitting for session {} (text: {}, photos: {})",
            self.session_id,
            !request.payload().chat_input.is_empty(),
            request.attachments().len()
        );
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let catalog = self.locale.catalog();
        let mut observer = SubmissionObserver {
            connection: &mut self.connection,
            last_error: &mut self.last_error,
            ui,
            catalog,
        };
        let transport = &self.transport;
        let request = &request;
        let outcome =
            dispatch_with_retry(&self.policy, &mut observer, |_| transport.post_chat(request))
                .await;

        match outcome {
            Ok(response) => {
                log::debug!("reply ({}): {}", response.status, response.body);
                if let Some(logger) = &self.logger {
                    logger.log_response(&response);
                }
                Ok(normalize(&InboundResponse::parse(&response.body)))
            }
            Err(err) => {
                if let Some(logger) = &self.logger {
                    logger.log_failure(&err);
                }
                Err(err)
            }
        }
    }

    fn render_failure(&self, ui: &mut dyn ChatUi, err: &Error) -> DisplayResult {
        SUBMISSIONS_FAILED.click();
        let category = err.category();
        log::warn!("submission failed ({category}): {err}");
        ui.clear_retry_notice();
        let catalog = self.catalog();
        let message = catalog.failure(category).to_string();
        ui.append_message(Sender::Agent, &message);
        if category == ErrorCategory::NetworkError {
            let suspects = self.probe.suspects();
            if !suspects.is_empty() {
                ui.append_message(Sender::System, &catalog.interference(&suspects));
            }
        }
        DisplayResult::Failure { category, message }
    }
}

/// Records attempt outcomes on the client and surfaces retries in the UI.
struct SubmissionObserver<'a> {
    connection: &'a mut ConnectionState,
    last_error: &'a mut Option<String>,
    ui: &'a mut dyn ChatUi,
    catalog: Catalog,
}

impl RetryObserver for SubmissionObserver<'_> {
    fn attempt_finished(&mut self, _attempt: u32, outcome: std::result::Result<(), &Error>) {
        match outcome {
            Ok(()) => {
                *self.connection = ConnectionState::Connected;
                *self.last_error = None;
            }
            Err(err) => {
                *self.connection = ConnectionState::from(err);
                *self.last_error = Some(err.to_string());
            }
        }
    }

    fn retrying(&mut self, notice: &RetryNotice, _error: &Error) {
        let text = self.catalog.retry_notice(notice);
        self.ui.show_retry_notice(notice, &text);
    }
}
