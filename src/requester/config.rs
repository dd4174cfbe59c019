use std::time::Duration;

/// Endpoints and per-attempt settings for the run.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    pub schedule_url: String,
    pub rating_url: String,
    pub proxy_directory_url: String,
    /// Per-attempt timeout for proxied requests. Kept short: a slow proxy is
    /// cheaper to replace than to wait for.
    pub attempt_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            schedule_url: "http://www.afisha.ru/msk/schedule_cinema/".to_string(),
            rating_url: "https://www.kinopoisk.ru/index.php".to_string(),
            proxy_directory_url: "http://www.freeproxy-list.ru/api/proxy".to_string(),
            attempt_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

/// How the resilient fetch loop reacts to transient transport faults.
///
/// The default retries forever with no backoff: the target site blocks
/// scripted clients, and rotating through a large disposable proxy pool is
/// the mitigation, so a failed attempt costs nothing but the next draw.
/// Bounded configurations exist so tests and batch jobs can terminate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` means retry until an attempt succeeds.
    pub max_attempts: Option<u32>,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::ZERO,
        }
    }

    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            backoff: Duration::ZERO,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}
