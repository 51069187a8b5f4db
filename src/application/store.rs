//! Concurrency-safe keyed store for per-user settings.
//!
//! Settings are created lazily on first touch and cleared explicitly.
//! Each user's data is only ever mutated by that user's request or
//! poll path, so a single `RwLock` over the map is sufficient; the
//! lock is never held across await points.

use crate::domain::UserSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// User identifier as handed in by the external messaging collaborator.
pub type UserId = u64;

/// Shared, process-lifetime store of user settings. Cheap to clone.
#[derive(Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<HashMap<UserId, UserSettings>>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against the user's settings, creating them on
    /// first touch. All inbound mutations go through here.
    pub async fn update<F, R>(&self, user: UserId, f: F) -> R
    where
        F: FnOnce(&mut UserSettings) -> R,
    {
        let mut map = self.inner.write().await;
        f(map.entry(user).or_default())
    }

    /// Clone of the user's current settings, if any exist.
    pub async fn snapshot(&self, user: UserId) -> Option<UserSettings> {
        self.inner.read().await.get(&user).cloned()
    }

    /// Drop everything stored for the user. Returns whether anything
    /// was there.
    pub async fn clear(&self, user: UserId) -> bool {
        self.inner.write().await.remove(&user).is_some()
    }

    /// Users with any stored settings.
    pub async fn user_ids(&self) -> Vec<UserId> {
        self.inner.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settings_are_created_on_first_touch() {
        let store = SettingsStore::new();
        assert!(store.snapshot(1).await.is_none());

        store
            .update(1, |s| s.set_keywords("steam").map(|_| ()))
            .await
            .unwrap();

        let snapshot = store.snapshot(1).await.unwrap();
        assert_eq!(snapshot.keywords, vec!["steam"]);
    }

    #[tokio::test]
    async fn clear_removes_the_user() {
        let store = SettingsStore::new();
        store.update(7, |s| s.min_price = 100.0).await;
        assert!(store.clear(7).await);
        assert!(!store.clear(7).await);
        assert!(store.snapshot(7).await.is_none());
    }

    #[tokio::test]
    async fn users_do_not_share_state() {
        let store = SettingsStore::new();
        store.update(1, |s| s.min_price = 100.0).await;
        store.update(2, |s| s.min_price = 200.0).await;

        assert_eq!(store.snapshot(1).await.unwrap().min_price, 100.0);
        assert_eq!(store.snapshot(2).await.unwrap().min_price, 200.0);

        let mut ids = store.user_ids().await;
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn concurrent_updates_from_many_users() {
        let store = SettingsStore::new();
        let mut handles = Vec::new();
        for user in 0..32u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.update(user, |s| s.min_price = user as f64).await;
            }));
        }
        futures::future::join_all(handles).await;

        for user in 0..32u64 {
            assert_eq!(store.snapshot(user).await.unwrap().min_price, user as f64);
        }
    }
}
