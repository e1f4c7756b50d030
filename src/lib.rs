// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod locale;
pub mod message;
pub mod normalize;
pub mod observability;
pub mod render;
pub mod retry;
pub mod session;
pub mod transport;
pub mod utils;

// Re-exports
pub use client::{ChatClient, DEFAULT_USER_AGENT, DisplayResult};
pub use client_logger::ExchangeLogger;
pub use connection::ConnectionState;
pub use diagnostics::{DiagnosticInfo, InterferenceProbe, NoInterference, ProxyEnvProbe};
pub use error::{Error, ErrorCategory, Result};
pub use locale::{Catalog, Locale};
pub use message::{
    Attachment, AttachmentSet, ChatPayload, ChatRequest, MAX_ATTACHMENT_BYTES, MAX_ATTACHMENTS,
    OutboundMessage,
};
pub use normalize::{DEFAULT_RULES, ExtractorRule, InboundResponse, Reply, normalize, normalize_with};
pub use observability::register_biometrics;
pub use render::{ChatUi, InputGuard, Sender, TerminalUi};
pub use retry::{RetryNotice, RetryObserver, RetryPolicy, dispatch_with_retry};
pub use session::SessionId;
pub use transport::{HttpTransport, RawResponse, Transport};
