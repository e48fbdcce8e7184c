//! Connectivity and the cosmetic sync indicator.
//!
//! Nothing here gates any other operation. A forced sync shows `syncing`
//! for a fixed delay and then settles back to `synced`.

use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    Synced,
    Pending,
    Syncing,
}

impl SyncStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Pending => "pending",
            Self::Syncing => "syncing",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncIndicator {
    online: bool,
    status: SyncStatus,
    settles_at: Option<Timestamp>,
    delay: Duration,
}

impl SyncIndicator {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            online: true,
            status: SyncStatus::Synced,
            settles_at: None,
            delay,
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Records a reachability change.
    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            tracing::info!(online, "connectivity changed");
        }
        self.online = online;
    }

    /// The status as of `now`.
    pub fn poll(&mut self, now: Timestamp) -> SyncStatus {
        if let Some(settles_at) = self.settles_at
            && now >= settles_at
        {
            self.status = SyncStatus::Synced;
            self.settles_at = None;
            tracing::debug!("sync settled");
        }
        self.status
    }

    /// Starts a manual sync. Ignored while offline.
    ///
    /// Returns whether the sync started.
    pub fn force_sync(&mut self, now: Timestamp) -> bool {
        if !self.online {
            tracing::debug!("force sync ignored while offline");
            return false;
        }
        let delay = SignedDuration::try_from(self.delay).unwrap_or(SignedDuration::MAX);
        self.status = SyncStatus::Syncing;
        self.settles_at = Some(now.saturating_add(delay).unwrap_or(now));
        tracing::info!("sync started");
        true
    }
}
