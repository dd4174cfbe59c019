use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

/// Flat pool of HTTP proxy addresses, fetched once per run from the proxy
/// directory and read-only afterwards. There is no health tracking: every
/// draw is uniform over the whole pool, so a dead proxy can be picked again.
#[derive(Clone, Debug, Default)]
pub struct ProxyPool {
    addresses: Vec<String>,
}

impl ProxyPool {
    /// Builds a pool from the directory response, one address per line.
    /// Blank lines are dropped so they never get drawn as a proxy.
    pub fn from_directory_body(body: &str) -> Self {
        let addresses: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        info!("Loaded {} proxies from the directory", addresses.len());
        Self { addresses }
    }

    /// Uniform random draw. `None` only when the pool is empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let address = self.addresses.choose(rng).map(String::as_str);
        if let Some(addr) = address {
            debug!("Selected proxy {}", addr);
        }
        address
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl From<Vec<String>> for ProxyPool {
    fn from(addresses: Vec<String>) -> Self {
        Self { addresses }
    }
}
