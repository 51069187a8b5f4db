//! Poll scheduler: recurring scan-filter-dedup cycles per user.
//!
//! Each user has at most one monitoring task. Starting replaces any
//! prior task for that user; stopping cancels cooperatively, so an
//! in-flight cycle is allowed to finish while the recurrence is
//! removed.

use crate::application::search::{LotMatch, SearchEngine};
use crate::application::store::{SettingsStore, UserId};
use crate::domain::{filter, Lot};
use crate::infrastructure::config::MonitorConfig;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delivery seam for new-lot notifications. Implemented by the
/// external messaging collaborator; the engine only decides *what* to
/// send and *when*.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_new_lot(&self, user: UserId, lot: &Lot, keyword: &str);
}

/// Source of scanned lots for a poll cycle. `SearchEngine` is the
/// production implementation; tests substitute canned pages.
#[async_trait]
pub trait CategoryScanner: Send + Sync {
    async fn scan(&self, category_url: &str) -> Vec<Lot>;
}

#[async_trait]
impl CategoryScanner for SearchEngine {
    async fn scan(&self, category_url: &str) -> Vec<Lot> {
        self.scan_category(category_url).await
    }
}

/// Registry of per-user monitoring tasks. Each entry is the
/// cancellation token of a detached poll loop; the loop exits on its
/// own once the token fires, so no join handle is retained.
pub struct MonitorRegistry {
    scanner: Arc<dyn CategoryScanner>,
    store: SettingsStore,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    tasks: Mutex<HashMap<UserId, CancellationToken>>,
}

impl MonitorRegistry {
    pub fn new(
        scanner: Arc<dyn CategoryScanner>,
        store: SettingsStore,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            scanner,
            store,
            notifier,
            config,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) monitoring for a user.
    ///
    /// Any prior task for the same user is cancelled first, so a user
    /// never has two concurrent poll loops.
    pub async fn start(self: &Arc<Self>, user: UserId) {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let registry = Arc::clone(self);
        let initial_delay = Duration::from_secs(self.config.initial_delay_secs);
        let interval = Duration::from_secs(self.config.poll_interval_secs);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = sleep(initial_delay) => {}
            }

            loop {
                let sent = registry.poll_once(user).await;
                if sent > 0 {
                    info!("Poll cycle for user {} sent {} notification(s)", user, sent);
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = sleep(interval) => {}
                }
            }
            debug!("Monitoring task for user {} exited", user);
        });

        let mut tasks = self.tasks.lock().await;
        if let Some(prev) = tasks.insert(user, cancel) {
            prev.cancel();
            warn!("Replaced an already-running monitoring task for user {}", user);
        } else {
            info!("Started monitoring for user {}", user);
        }
    }

    /// Stop monitoring for a user. Returns whether a task was running.
    /// Cancellation is cooperative: an in-flight cycle finishes.
    pub async fn stop(&self, user: UserId) -> bool {
        let mut tasks = self.tasks.lock().await;
        match tasks.remove(&user) {
            Some(cancel) => {
                cancel.cancel();
                info!("Stopped monitoring for user {}", user);
                true
            }
            None => false,
        }
    }

    /// Whether a monitoring task is registered for the user.
    pub async fn is_running(&self, user: UserId) -> bool {
        self.tasks.lock().await.contains_key(&user)
    }

    /// Run one poll cycle for a user: scan every category, isolate
    /// genuinely new matches through the watchlist, notify up to the
    /// per-cycle cap with pacing, then evict stale watchlist entries.
    ///
    /// Returns the number of notifications sent.
    pub async fn poll_once(&self, user: UserId) -> usize {
        let Some(settings) = self.store.snapshot(user).await else {
            return 0;
        };
        if !settings.is_searchable() {
            debug!("User {} has no categories or keywords, skipping cycle", user);
            return 0;
        }

        let mut fresh: Vec<LotMatch> = Vec::new();
        for category_url in &settings.categories {
            let lots = self.scanner.scan(category_url).await;

            let matched: Vec<LotMatch> = lots
                .into_iter()
                .filter_map(|lot| {
                    filter::match_lot(&lot, &settings).map(|kw| LotMatch {
                        keyword: kw.to_string(),
                        lot,
                    })
                })
                .collect();
            if matched.is_empty() {
                continue;
            }

            // Record all new identities, even beyond the notification
            // cap, so a capped lot is not re-reported next cycle.
            let now = Utc::now();
            let new_here: Vec<LotMatch> = self
                .store
                .update(user, |s| {
                    matched
                        .into_iter()
                        .filter(|m| {
                            if s.watchlist.seen(&m.lot.identity) {
                                false
                            } else {
                                s.watchlist.record(m.lot.identity.clone(), now);
                                true
                            }
                        })
                        .collect()
                })
                .await;
            fresh.extend(new_here);
        }

        let mut sent = 0;
        for m in fresh.iter().take(self.config.max_notifications_per_cycle) {
            if sent > 0 {
                sleep(Duration::from_millis(self.config.notification_pacing_ms)).await;
            }
            self.notifier.notify_new_lot(user, &m.lot, &m.keyword).await;
            sent += 1;
        }

        // Eviction runs after this cycle's recording, once per cycle.
        let cutoff = Utc::now() - ChronoDuration::days(self.config.retention_days);
        let evicted = self
            .store
            .update(user, |s| s.watchlist.evict_older_than(cutoff))
            .await;
        if evicted > 0 {
            debug!("Evicted {} stale watchlist entr(ies) for user {}", evicted, user);
        }

        sent
    }
}
