//! Connectivity signal: a shared online/offline flag with edge notifications.
//!
//! [`Connectivity`] is the single writer. Subscribers get a
//! `watch::Receiver<bool>` and wake only when the value actually changes,
//! never because the same reading was published again.

use std::time::Duration;

use reqwest::Url;
use tokio::{net::TcpStream, sync::watch, time};
use tracing::{debug, info};

/// Publisher side of the connectivity signal.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Publishes a reading. Returns true if it changed the value.
    pub fn set(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Decides online/offline by opening a TCP connection to the API host.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ConnectivityProbe {
    /// Builds a probe for the host and port of `url`.
    ///
    /// Returns `None` if the URL doesn't parse or names no host.
    pub fn for_url(url: &str, timeout: Duration) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        Some(Self {
            host: url.host_str()?.to_string(),
            port: url.port_or_known_default()?,
            timeout,
        })
    }

    /// One reading: can we reach the host right now?
    pub async fn check(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        matches!(time::timeout(self.timeout, connect).await, Ok(Ok(_)))
    }

    /// Probes forever, publishing every reading to `connectivity`.
    pub async fn run(self, connectivity: Connectivity, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let online = self.check().await;
            if connectivity.set(online) {
                info!(online, host = %self.host, "connectivity changed");
            } else {
                debug!(online, "connectivity unchanged");
            }
        }
    }
}
