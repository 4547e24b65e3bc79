//! Best-effort delivery of sanitized payloads to a local debug listener.
//!
//! Every payload is sanitized, rendered as pretty-printed JSON and POSTed on
//! its own request. A payload that fails to sanitize is replaced by a failure
//! document; a request that fails to reach the listener is logged and
//! dropped. Nothing here can fail the calling program.

use std::{
    sync::{OnceLock, RwLock},
    thread,
    time::Duration,
};

use reqwest::{blocking::Client, header::CONTENT_TYPE};
use tracing::{debug, warn};

use crate::{error::SanitizeError, inspect::Inspect, sanitize::sanitize};

/// Endpoint used until [`set_endpoint`] is called.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:53821";

/// Client-side request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Pause between consecutive requests of one multi-payload call.
pub const DEFAULT_PAUSE_MS: u64 = 100;

static ENDPOINT: RwLock<Option<String>> = RwLock::new(None);

/// Replaces the process-wide endpoint. Last writer wins.
pub fn set_endpoint(url: impl Into<String>) {
    let mut slot = ENDPOINT
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *slot = Some(url.into());
}

/// The process-wide endpoint.
pub fn endpoint() -> String {
    ENDPOINT
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Fixed endpoint; `None` follows [`set_endpoint`] at send time.
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Pause between consecutive requests in milliseconds.
    pub pause_ms: u64,
}

impl DispatchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin this dispatcher to one endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub const fn with_pause_ms(mut self, pause_ms: u64) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    fn resolved_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(endpoint)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

/// Sends sanitized payloads over HTTP.
///
/// Payloads are sanitized on the calling thread. Delivery runs on a scoped
/// worker thread that owns the blocking HTTP client, and each call waits for
/// it before returning. The client keeps its own runtime, which must never be
/// built or dropped on an async executor thread, so calling from inside a
/// tokio runtime is safe.
#[derive(Debug, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Sends one payload.
    pub fn send(&self, payload: &dyn Inspect) {
        self.deliver(vec![body_for(payload)]);
    }

    /// Sends each payload on its own request, in order, pausing between
    /// requests.
    pub fn send_all(&self, payloads: &[&dyn Inspect]) {
        let bodies = payloads.iter().map(|payload| body_for(*payload)).collect();
        self.deliver(bodies);
    }

    fn deliver(&self, bodies: Vec<Vec<u8>>) {
        if bodies.is_empty() {
            return;
        }
        let endpoint = self.config.resolved_endpoint();
        let config = &self.config;
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("dbug-dispatch".to_string())
                .spawn_scoped(scope, || post_all(config, &endpoint, bodies));
            match worker {
                Ok(worker) => {
                    if worker.join().is_err() {
                        warn!("dispatch worker panicked; payloads were dropped");
                    }
                }
                Err(err) => warn!(error = %err, "failed to start dispatch worker; payloads were dropped"),
            }
        });
    }
}

fn post_all(config: &DispatchConfig, endpoint: &str, bodies: Vec<Vec<u8>>) {
    let client = match Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "failed to build HTTP client; payloads were dropped");
            return;
        }
    };
    let pause = Duration::from_millis(config.pause_ms);
    for (index, body) in bodies.into_iter().enumerate() {
        if index > 0 {
            thread::sleep(pause);
        }
        post(&client, endpoint, body);
    }
}

fn post(client: &Client, endpoint: &str, body: Vec<u8>) {
    let outcome = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send();
    // The listener's response and any transport failure are ignored.
    if let Err(err) = outcome {
        debug!(endpoint, error = %err, "debug payload was not delivered");
    }
}

/// Renders `payload` as the pretty-printed JSON body that would be sent.
pub fn render(payload: &dyn Inspect) -> Result<Vec<u8>, SanitizeError> {
    let tree = sanitize(payload)?;
    Ok(serde_json::to_vec_pretty(&tree)?)
}

fn body_for(payload: &dyn Inspect) -> Vec<u8> {
    render(payload).unwrap_or_else(|err| {
        debug!(error = %err, "payload failed to sanitize; sending failure document");
        failure_body(&err)
    })
}

fn failure_body(err: &SanitizeError) -> Vec<u8> {
    serde_json::to_vec_pretty(&err.to_document()).unwrap_or_else(|_| {
        br#"{"error": "Serialization failed"}"#.to_vec()
    })
}

fn shared() -> &'static Dispatcher {
    static SHARED: OnceLock<Dispatcher> = OnceLock::new();
    SHARED.get_or_init(Dispatcher::default)
}

/// Sends one payload to the process-wide endpoint.
pub fn send(payload: &dyn Inspect) {
    shared().send(payload);
}

/// Sends several payloads to the process-wide endpoint, one request each.
pub fn send_all(payloads: &[&dyn Inspect]) {
    shared().send_all(payloads);
}
