//! Write-once card metadata cache, filled in the background as cards are drawn.
//!
//! Each card name maps to a single `OnceCell`. Whoever initialises the cell
//! first (a prefetch task or a reader falling back to a direct lookup) runs
//! the only fetch for that name; everyone else waits on the same cell.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::{OnceCell, Semaphore};

use crate::card_fetcher::CardInfoProvider;
use crate::error::DraftError;
use crate::models::card_info::{card_link, CardInfo};
use crate::opt::{log_if, DbgFlg};

type CacheSlot = Arc<OnceCell<Option<CardInfo>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum EntryState {
    #[strum(serialize = "pending")]
    Pending,
    #[strum(serialize = "found")]
    Found,
    #[strum(serialize = "not found")]
    Missing,
}

pub struct CardCache {
    provider: Arc<dyn CardInfoProvider>,
    entries: Mutex<HashMap<String, CacheSlot>>,
    workers: Arc<Semaphore>,
    runtime: Handle,
}

impl CardCache {
    /// Must be called from within a tokio runtime; prefetch tasks are spawned
    /// onto it.
    pub fn new(provider: Arc<dyn CardInfoProvider>, workers: usize) -> Result<Self, DraftError> {
        let runtime = Handle::try_current().map_err(|err| {
            DraftError::InvalidState(format!("card cache needs a tokio runtime: {}", err))
        })?;

        Ok(CardCache {
            provider,
            entries: Mutex::new(HashMap::new()),
            workers: Arc::new(Semaphore::new(workers.max(1))),
            runtime,
        })
    }

    /// Returns the slot for `name`, and whether this call created it.
    fn slot(&self, name: &str) -> (CacheSlot, bool) {
        let mut entries = self.lock_entries();
        match entries.get(name) {
            Some(slot) => (slot.clone(), false),
            None => {
                let slot = CacheSlot::default();
                entries.insert(name.to_string(), slot.clone());
                (slot, true)
            }
        }
    }

    /// Schedules a background lookup for `name` unless one was already
    /// scheduled or completed. Never blocks.
    pub fn prefetch(&self, name: &str) {
        let (slot, created) = self.slot(name);
        if !created {
            return;
        }

        let provider = self.provider.clone();
        let workers = self.workers.clone();
        let name = name.to_string();
        self.runtime.spawn(async move {
            let Ok(_permit) = workers.acquire_owned().await else {
                return;
            };
            slot.get_or_init(|| lookup(provider.as_ref(), &name)).await;
        });
    }

    /// Metadata for `name`, waiting on an in-flight lookup or performing one
    /// directly when the card was never prefetched. A failed lookup stays
    /// cached as `None`.
    pub async fn get(&self, name: &str) -> Option<CardInfo> {
        let (slot, _) = self.slot(name);
        slot.get_or_init(|| lookup(self.provider.as_ref(), name))
            .await
            .clone()
    }

    /// Display string for `name`: a link, or a not-found marker.
    pub async fn display(&self, name: &str) -> String {
        let info = self.get(name).await;
        card_link(name, info.as_ref())
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.lock_entries().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every cached name and its state, sorted by name.
    pub fn entries(&self) -> Vec<(String, EntryState)> {
        let mut entries = self
            .lock_entries()
            .iter()
            .map(|(name, slot)| {
                let state = match slot.get() {
                    None => EntryState::Pending,
                    Some(Some(_)) => EntryState::Found,
                    Some(None) => EntryState::Missing,
                };
                (name.clone(), state)
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheSlot>> {
        match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn lookup(provider: &dyn CardInfoProvider, name: &str) -> Option<CardInfo> {
    match provider.fetch_card(name).await {
        Ok(info) => {
            log_if(&format!("Cached card info for {}", name), DbgFlg::Cache);
            Some(info)
        }
        Err(err) => {
            log_if(&format!("Lookup failed for {}: {}", name, err), DbgFlg::Fetch);
            None
        }
    }
}


#[cfg(test)]
mod test {
    use super::test_support::*;
    use super::*;
    use std::time::Duration;

    fn cache_with(provider: Arc<MockProvider>, workers: usize) -> CardCache {
        CardCache::new(provider, workers).unwrap()
    }

    #[test]
    fn test_new_outside_runtime() {
        let provider = Arc::new(MockProvider::new(&[]));
        assert!(matches!(
            CardCache::new(provider, 4),
            Err(DraftError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_get_falls_back_to_direct_lookup() {
        let provider = Arc::new(MockProvider::new(&["Forest"]));
        let cache = cache_with(provider.clone(), 4);

        let info = cache.get("Forest").await.unwrap();
        assert_eq!(info.scryfall_uri, uri_for("Forest"));
        assert_eq!(provider.calls(), 1);

        assert_eq!(cache.get("Forest").await, Some(info));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_once_per_name() {
        let provider =
            Arc::new(MockProvider::new(&["Island"]).with_delay(Duration::from_millis(20)));
        let cache = cache_with(provider.clone(), 4);

        cache.prefetch("Island");
        cache.prefetch("Island");
        assert!(cache.contains("Island"));

        let first = cache.get("Island").await;
        let second = cache.get("Island").await;
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_is_permanent() {
        let provider = Arc::new(MockProvider::new(&[]));
        let cache = cache_with(provider.clone(), 4);

        assert_eq!(cache.display("Mox Lotus").await, "[Mox Lotus]<URL Not Found>");
        assert_eq!(cache.get("Mox Lotus").await, None);
        cache.prefetch("Mox Lotus");
        assert_eq!(cache.get("Mox Lotus").await, None);
        assert_eq!(provider.calls(), 1);
        assert_eq!(
            cache.entries(),
            vec![("Mox Lotus".to_string(), EntryState::Missing)]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_share_one_fetch() {
        let provider =
            Arc::new(MockProvider::new(&["Swamp"]).with_delay(Duration::from_millis(30)));
        let cache = Arc::new(cache_with(provider.clone(), 2));

        cache.prefetch("Swamp");
        let readers = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.display("Swamp").await })
            })
            .collect::<Vec<_>>();

        for reader in readers {
            let shown = reader.await.unwrap();
            assert_eq!(shown, format!("[Swamp](<{}>)", uri_for("Swamp")));
        }
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_prefetch_fills_in_background() {
        let provider = Arc::new(MockProvider::new(&["Plains", "Mountain"]));
        let cache = cache_with(provider.clone(), 1);

        cache.prefetch("Plains");
        cache.prefetch("Mountain");
        cache.prefetch("Unknown Card");

        for _ in 0..100 {
            if cache.entries().iter().all(|(_, state)| *state != EntryState::Pending) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(
            cache.entries(),
            vec![
                ("Mountain".to_string(), EntryState::Found),
                ("Plains".to_string(), EntryState::Found),
                ("Unknown Card".to_string(), EntryState::Missing),
            ]
        );
        assert_eq!(provider.calls(), 3);
        assert_eq!(cache.len(), 3);
    }
}
