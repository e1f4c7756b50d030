//! Configuration types for the chat application.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! the `WEBHOOK_CHAT_BASE_URL` environment variable, then command-line
//! arguments parsed via `arrrg`.

use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use crate::transport::{DEFAULT_CHAT_PATH, DEFAULT_HEALTH_PATH};

/// Where the local chat proxy listens unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the proxy's base URL.
pub const BASE_URL_ENV: &str = "WEBHOOK_CHAT_BASE_URL";

const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5000;

/// Command-line arguments for the webhook-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// YAML file to read settings from.
    #[arrrg(optional, "YAML configuration file", "PATH")]
    pub config: Option<String>,

    /// Base URL of the chat proxy.
    #[arrrg(optional, "Base URL of the chat proxy (default: http://localhost:8000)", "URL")]
    pub base_url: Option<String>,

    #[arrrg(optional, "Attempts per message (default: 3)", "N")]
    pub max_attempts: Option<u32>,

    #[arrrg(optional, "Delay before the first retry in ms (default: 1000)", "MS")]
    pub base_delay_ms: Option<u64>,

    #[arrrg(optional, "Per-attempt timeout in ms (default: 10000)", "MS")]
    pub timeout_ms: Option<u64>,

    /// Language of the user-facing strings.
    #[arrrg(optional, "Chat language: he or en (default: he)", "LOCALE")]
    pub locale: Option<String>,

    /// Message sent on startup without being echoed.
    #[arrrg(optional, "Opening message sent on startup", "TEXT")]
    pub greeting: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat client.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the proxy in front of the automation webhook.
    pub base_url: String,

    /// Path of the chat endpoint, relative to `base_url`.
    pub chat_path: String,

    /// Path of the health endpoint, relative to `base_url`.
    pub health_path: String,

    /// Attempts per submission.
    pub max_attempts: u32,

    /// Delay before the first retry; doubled for each later one.
    pub base_delay_ms: u64,

    /// Time budget of a single attempt.
    pub request_timeout_ms: u64,

    /// Time budget of a health probe.
    pub health_timeout_ms: u64,

    pub locale: Locale,

    /// Reported in payloads and the HTTP `User-Agent` header.
    pub user_agent: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Optional opening message sent when the chat starts.
    pub greeting: Option<String>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            health_timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
            locale: Locale::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            use_color: true,
            greeting: None,
        }
    }

    /// Loads a configuration from a YAML file.  Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("could not read {}: {e}", path.display()), e))?;
        Self::from_yaml_str(&content)
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::serialization(format!("invalid configuration: {e}"), Some(Box::new(e)))
        })
    }

    /// Resolves the configuration for a run of the binary.
    pub fn load(args: ChatArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        config
            .with_env_overrides(|name| std::env::var(name).ok())
            .with_args(args)
    }

    /// Applies environment overrides, looking variables up with `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            log::debug!("base URL taken from {BASE_URL_ENV}");
            self.base_url = base_url.trim().to_string();
        }
        self
    }

    /// Applies command-line arguments on top of this configuration.
    pub fn with_args(mut self, args: ChatArgs) -> Result<Self> {
        if let Some(base_url) = args.base_url {
            self.base_url = base_url;
        }
        if let Some(max_attempts) = args.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(base_delay_ms) = args.base_delay_ms {
            self.base_delay_ms = base_delay_ms;
        }
        if let Some(timeout_ms) = args.timeout_ms {
            self.request_timeout_ms = timeout_ms;
        }
        if let Some(locale) = args.locale {
            self.locale = locale.parse()?;
        }
        if args.greeting.is_some() {
            self.greeting = args.greeting;
        }
        if args.no_color {
            self.use_color = false;
        }
        Ok(self)
    }

    /// Sets the proxy's base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the attempts per submission.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.request_timeout_ms = request_timeout_ms;
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

    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The retry policy these settings describe.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_attempt_timeout(Duration::from_millis(self.request_timeout_ms))
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}
