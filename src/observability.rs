use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("webhook_chat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("webhook_chat.client.request_errors");
pub(crate) static CLIENT_REQUEST_TIMEOUTS: Counter =
    Counter::new("webhook_chat.client.request_timeouts");
pub(crate) static CLIENT_REQUEST_RETRIES: Counter = Counter::new("webhook_chat.client.retries");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("webhook_chat.client.request_duration_seconds");
pub(crate) static CLIENT_RETRY_BACKOFF: Moments =
    Moments::new("webhook_chat.client.retry_backoff_seconds");

pub(crate) static SUBMISSIONS: Counter = Counter::new("webhook_chat.submit.count");
pub(crate) static SUBMISSIONS_SKIPPED: Counter = Counter::new("webhook_chat.submit.skipped");
pub(crate) static SUBMISSIONS_FAILED: Counter = Counter::new("webhook_chat.submit.failed");
pub(crate) static SUBMIT_DURATION: Moments =
    Moments::new("webhook_chat.submit.duration_seconds");

pub(crate) static HEALTH_PROBES: Counter = Counter::new("webhook_chat.health.probes");
pub(crate) static HEALTH_FAILURES: Counter = Counter::new("webhook_chat.health.failures");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_REQUEST_TIMEOUTS);
    collector.register_counter(&CLIENT_REQUEST_RETRIES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_moments(&CLIENT_RETRY_BACKOFF);

    collector.register_counter(&SUBMISSIONS);
    collector.register_counter(&SUBMISSIONS_SKIPPED);
    collector.register_counter(&SUBMISSIONS_FAILED);
    collector.register_moments(&SUBMIT_DURATION);

    collector.register_counter(&HEALTH_PROBES);
    collector.register_counter(&HEALTH_FAILURES);
}
