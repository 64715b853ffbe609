use std::sync::Arc;

use qth_common::{AcquisitionState, QthSnapshot, ResolvedLocation};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// How the register treats a publish from a cycle older than the newest one
/// it has accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Ignore it. A slow response from a superseded cycle never overwrites
    /// a newer result.
    #[default]
    DropStale,
    /// Accept every publish in completion order.
    LastWriterWins,
}

/// Single-writer slot holding the published [`QthSnapshot`].
///
/// Readers get the current value or subscribe to changes. Every publish is
/// stamped with the cycle that produced it.
#[derive(Debug)]
pub struct ResultRegister {
    tx: watch::Sender<QthSnapshot>,
    policy: StalePolicy,
}

impl ResultRegister {
    pub fn new(policy: StalePolicy) -> Self {
        let (tx, _) = watch::channel(QthSnapshot::idle());
        Self { tx, policy }
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Publish a state change for `cycle`. `location` replaces the stored
    /// result when set; `None` keeps whatever was there.
    ///
    /// Returns false if the publish was dropped as stale.
    pub fn publish(
        &self,
        cycle: u64,
        state: AcquisitionState,
        location: Option<Arc<ResolvedLocation>>,
    ) -> bool {
        let policy = self.policy;
        let accepted = self.tx.send_if_modified(|current| {
            if policy == StalePolicy::DropStale && cycle < current.cycle {
                return false;
            }
            current.cycle = cycle;
            current.state = state.clone();
            if let Some(location) = location {
                current.location = Some(location);
            }
            true
        });

        if !accepted {
            debug!("Dropped stale publish from cycle {}: {:?}", cycle, state);
        }
        accepted
    }

    pub fn latest(&self) -> QthSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QthSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for ResultRegister {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}
