use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

use crate::config::NetworkConfig;

/// Push-based reachability flag.
///
/// Writers report what they observe; subscribers only wake on a real
/// transition. The orchestrator reads the current value once per cycle.
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self { tx }
    }

    /// Record the latest observation. Returns true when the flag flipped.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!("Network is now {}", if online { "reachable" } else { "unreachable" });
        }
        changed
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Periodic TCP connect to a well-known host, feeding a [`NetworkMonitor`].
pub struct ReachabilityProbe {
    monitor: NetworkMonitor,
    address: String,
    every: Duration,
    connect_timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(
        monitor: NetworkMonitor,
        address: impl Into<String>,
        every: Duration,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            monitor,
            address: address.into(),
            every,
            connect_timeout,
        }
    }

    /// Probe for `config.probe_address`, or `None` when probing is off.
    pub fn from_config(monitor: &NetworkMonitor, config: &NetworkConfig) -> Option<Self> {
        let address = config.probe_address.as_ref()?;
        Some(Self::new(
            monitor.clone(),
            address.clone(),
            Duration::from_secs(config.probe_interval_secs.max(1)),
            Duration::from_secs(config.probe_timeout_secs),
        ))
    }

    pub async fn probe_once(&self) -> bool {
        let online = matches!(
            tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.address)).await,
            Ok(Ok(_))
        );
        debug!("Probe {} -> {}", self.address, online);
        self.monitor.set_online(online);
        online
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting reachability probe for {} (interval: {:?})",
            self.address, self.every
        );

        tokio::spawn(async move {
            let mut ticker = interval(self.every);
            loop {
                ticker.tick().await;
                self.probe_once().await;
            }
        })
    }
}
