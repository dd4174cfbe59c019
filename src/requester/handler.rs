use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Proxy;
use std::thread;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

use super::config::RequestConfig;
use crate::proxy::identity::random_user_agent;
use crate::proxy::pool::ProxyPool;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("proxy pool is empty, cannot rotate")]
    EmptyProxyPool,
    #[error("gave up after {0} failed attempts")]
    AttemptsExhausted(u32),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Failures at the wire level, split by whether another attempt through a
/// different proxy can plausibly fix them.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transient transport fault: {0}")]
    Transient(String),
    #[error("{0}")]
    Fatal(String),
}

/// Seam between the retry loop and the actual HTTP stack, so tests can
/// script failure sequences without a network.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        proxy: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, TransportError>;
}

/// Real transport over a blocking reqwest client. The client is rebuilt per
/// attempt because the proxy changes on every draw.
pub struct HttpTransport {
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn build_browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        reqwest::header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        reqwest::header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(reqwest::header::USER_AGENT, value);
    }
    headers
}

/// Timeouts, refused or reset connections and proxy faults are expected to
/// resolve on a different network path; everything else is not retried.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() || err.is_connect() {
        TransportError::Transient(err.to_string())
    } else {
        TransportError::Fatal(err.to_string())
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        proxy: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, TransportError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .gzip(true)
            .deflate(true);

        if let Some(address) = proxy {
            let proxy_url = if address.contains("://") {
                address.to_string()
            } else {
                format!("http://{address}")
            };
            // A malformed directory entry counts as a proxy fault.
            let proxy = Proxy::all(&proxy_url)
                .map_err(|e| TransportError::Transient(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            if proxy.is_some() {
                TransportError::Transient(e.to_string())
            } else {
                TransportError::Fatal(e.to_string())
            }
        })?;

        let mut request = client.get(url).query(params);
        if let Some(agent) = user_agent {
            request = request.headers(build_browser_headers(agent));
        }

        // No status-code check: whatever body the proxy handed back goes to
        // the parser, which decides what it can extract.
        let response = request.send().map_err(classify)?;
        response.text().map_err(classify)
    }
}

/// Issues page fetches for the run. Proxied fetches loop through random
/// (proxy, identity) pairs until one attempt succeeds.
pub struct RequestHandler<T: Transport = HttpTransport> {
    config: RequestConfig,
    transport: T,
}

impl RequestHandler<HttpTransport> {
    pub fn new(config: RequestConfig) -> Self {
        let transport = HttpTransport::new(config.attempt_timeout);
        Self { config, transport }
    }
}

impl<T: Transport> RequestHandler<T> {
    pub fn with_transport(config: RequestConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// One logical GET through the rotating proxy pool.
    ///
    /// Blocks until an attempt succeeds. Only three things surface as
    /// errors: an empty pool (checked before any attempt), an exhausted
    /// bounded retry policy, and a non-transient transport failure.
    pub fn fetch_page<R: Rng + ?Sized>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        pool: &ProxyPool,
        rng: &mut R,
    ) -> Result<String, FetchError> {
        if pool.is_empty() {
            return Err(FetchError::EmptyProxyPool);
        }

        let mut attempts = 0u32;
        loop {
            let proxy = pool.choose(rng).ok_or(FetchError::EmptyProxyPool)?;
            let user_agent = random_user_agent(rng);
            debug!("Try proxy {}...", proxy);
            attempts += 1;

            match self.transport.get(url, params, Some(proxy), Some(user_agent)) {
                Ok(body) => {
                    debug!("Got {} bytes after {} attempt(s)", body.len(), attempts);
                    return Ok(body);
                }
                Err(TransportError::Transient(reason)) => {
                    warn!("Connect error via proxy {}: {}. Reconnect...", proxy, reason);
                    if let Some(max) = self.config.retry.max_attempts {
                        if attempts >= max {
                            return Err(FetchError::AttemptsExhausted(attempts));
                        }
                    }
                    if !self.config.retry.backoff.is_zero() {
                        thread::sleep(self.config.retry.backoff);
                    }
                }
                Err(TransportError::Fatal(reason)) => {
                    return Err(FetchError::Transport(reason));
                }
            }
        }
    }

    /// Plain GET without proxy rotation, for the schedule page and the proxy
    /// directory. No retry: without these pages there is no work to do.
    pub fn fetch_direct(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        self.transport
            .get(url, params, None, None)
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requester::config::RetryPolicy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays a fixed sequence of attempt outcomes. Every transient
    /// outcome it serves takes the warn-and-retry branch in the loop, so
    /// `transient_faults` doubles as the retry-event count.
    struct ScriptedTransport {
        script: RefCell<VecDeque<Result<String, TransportError>>>,
        attempts: Cell<u32>,
        transient_faults: Cell<u32>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<String, TransportError>>) -> Self {
            Self {
                script: RefCell::new(script.into_iter().collect()),
                attempts: Cell::new(0),
                transient_faults: Cell::new(0),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn get(
            &self,
            _url: &str,
            _params: &[(&str, &str)],
            proxy: Option<&str>,
            user_agent: Option<&str>,
        ) -> Result<String, TransportError> {
            assert!(proxy.is_some(), "proxied fetch must carry a proxy");
            assert!(user_agent.is_some(), "proxied fetch must carry an identity");
            self.attempts.set(self.attempts.get() + 1);
            let outcome = self
                .script
                .borrow_mut()
                .pop_front()
                .expect("transport called more times than scripted");
            if matches!(outcome, Err(TransportError::Transient(_))) {
                self.transient_faults.set(self.transient_faults.get() + 1);
            }
            outcome
        }
    }

    fn timeout() -> TransportError {
        TransportError::Transient("connection timed out".to_string())
    }

    fn pool_of(n: usize) -> ProxyPool {
        ProxyPool::from((0..n).map(|i| format!("10.0.0.{i}:8080")).collect::<Vec<_>>())
    }

    #[test]
    fn test_returns_body_after_transient_failures() {
        // Two simulated connection timeouts, then a success: the caller sees
        // only the final body, after exactly three attempts.
        let transport = ScriptedTransport::new(vec![
            Err(timeout()),
            Err(timeout()),
            Ok("<html>ok</html>".to_string()),
        ]);
        let handler = RequestHandler::with_transport(RequestConfig::default(), transport);
        let mut rng = StdRng::seed_from_u64(3);

        let body = handler
            .fetch_page("http://example.test/", &[], &pool_of(3), &mut rng)
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
        assert_eq!(handler.transport.attempts.get(), 3);
        // Exactly two retry events preceded the success, each logged at
        // warn level by the loop.
        assert_eq!(handler.transport.transient_faults.get(), 2);
    }

    #[test]
    fn test_empty_pool_fails_before_any_attempt() {
        let transport = ScriptedTransport::new(vec![Ok("never reached".to_string())]);
        let handler = RequestHandler::with_transport(RequestConfig::default(), transport);
        let mut rng = StdRng::seed_from_u64(3);

        let err = handler
            .fetch_page("http://example.test/", &[], &ProxyPool::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyProxyPool));
        assert_eq!(handler.transport.attempts.get(), 0);
    }

    #[test]
    fn test_bounded_policy_stops_retrying() {
        let transport =
            ScriptedTransport::new(vec![Err(timeout()), Err(timeout()), Err(timeout())]);
        let config = RequestConfig {
            retry: RetryPolicy::bounded(3),
            ..RequestConfig::default()
        };
        let handler = RequestHandler::with_transport(config, transport);
        let mut rng = StdRng::seed_from_u64(3);

        let err = handler
            .fetch_page("http://example.test/", &[], &pool_of(2), &mut rng)
            .unwrap_err();
        assert!(matches!(err, FetchError::AttemptsExhausted(3)));
        assert_eq!(handler.transport.attempts.get(), 3);
    }

    #[test]
    fn test_fatal_transport_error_propagates() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Fatal(
            "response body is not valid".to_string(),
        ))]);
        let handler = RequestHandler::with_transport(RequestConfig::default(), transport);
        let mut rng = StdRng::seed_from_u64(3);

        let err = handler
            .fetch_page("http://example.test/", &[], &pool_of(2), &mut rng)
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(handler.transport.attempts.get(), 1);
    }

    #[test]
    fn test_success_on_first_attempt_does_not_retry() {
        let transport = ScriptedTransport::new(vec![Ok("body".to_string())]);
        let handler = RequestHandler::with_transport(RequestConfig::default(), transport);
        let mut rng = StdRng::seed_from_u64(3);

        let body = handler
            .fetch_page("http://example.test/", &[], &pool_of(1), &mut rng)
            .unwrap();
        assert_eq!(body, "body");
        assert_eq!(handler.transport.attempts.get(), 1);
    }
}
