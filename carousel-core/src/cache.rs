use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CarouselError, Result};
use crate::models::{CacheState, Wallpaper};

enum Slot {
    Uninitialized,
    Empty,
    /// Never holds an empty deque.
    Populated(VecDeque<Wallpaper>),
}

/// In-memory rotation of the current catalog page.
///
/// Starts uninitialized. [`replace`](Self::replace) swaps in a whole new
/// sequence, [`evict_all`](Self::evict_all) drops back to uninitialized.
/// Reads are `async fn`s: nothing happens until the future is polled, and
/// polling a fresh call always re-reads current state. Every operation takes
/// the same lock, so a swap or rotation is never observed half done.
pub struct RotationCache {
    slot: Mutex<Slot>,
}

impl RotationCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Uninitialized),
        }
    }

    /// Wallpaper at the front of the rotation.
    pub async fn current(&self) -> Result<Wallpaper> {
        match &*self.slot.lock() {
            Slot::Populated(items) => items.front().cloned().ok_or(CarouselError::EmptyCache),
            _ => Err(CarouselError::EmptyCache),
        }
    }

    /// Move the front wallpaper to the back and return the new front.
    pub async fn advance(&self) -> Result<Wallpaper> {
        match &mut *self.slot.lock() {
            Slot::Populated(items) => {
                if let Some(front) = items.pop_front() {
                    items.push_back(front);
                }
                items.front().cloned().ok_or(CarouselError::EmptyCache)
            }
            _ => Err(CarouselError::EmptyCache),
        }
    }

    /// Number of cached wallpapers. Zero is a valid answer once populated;
    /// only an uninitialized cache fails.
    pub async fn count(&self) -> Result<usize> {
        match &*self.slot.lock() {
            Slot::Uninitialized => Err(CarouselError::EmptyCache),
            Slot::Empty => Ok(0),
            Slot::Populated(items) => Ok(items.len()),
        }
    }

    /// Toggle `liked` on the wallpaper with `id`. Unknown ids and an
    /// uninitialized cache are ignored.
    pub fn set_liked(&self, id: &str) {
        let mut slot = self.slot.lock();
        let Slot::Populated(items) = &mut *slot else {
            debug!(id, "like ignored, cache not populated");
            return;
        };
        match items.iter_mut().find(|wp| wp.id == id) {
            Some(wp) => {
                wp.liked = !wp.liked;
                debug!(id, liked = wp.liked, "like toggled");
            }
            None => debug!(id, "like ignored, wallpaper not cached"),
        }
    }

    /// Swap in a new sequence, discarding whatever was cached before.
    pub fn replace(&self, items: impl IntoIterator<Item = Wallpaper>) {
        let items: VecDeque<Wallpaper> = items.into_iter().collect();
        let count = items.len();
        let next = if items.is_empty() {
            Slot::Empty
        } else {
            Slot::Populated(items)
        };
        *self.slot.lock() = next;
        debug!(count, "rotation cache replaced");
    }

    pub fn is_populated(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Populated(_))
    }

    pub fn contains(&self, id: &str) -> bool {
        match &*self.slot.lock() {
            Slot::Populated(items) => items.iter().any(|wp| wp.id == id),
            _ => false,
        }
    }

    /// True until the first [`replace`](Self::replace) after startup or
    /// [`evict_all`](Self::evict_all).
    pub fn is_uninitialized(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Uninitialized)
    }

    pub fn evict_all(&self) {
        *self.slot.lock() = Slot::Uninitialized;
        debug!("rotation cache evicted");
    }

    pub fn state(&self) -> CacheState {
        match &*self.slot.lock() {
            Slot::Uninitialized => CacheState::Uninitialized,
            Slot::Empty => CacheState::Empty,
            Slot::Populated(_) => CacheState::Populated,
        }
    }

    /// Front-to-back copy of the rotation, `None` while uninitialized.
    pub fn snapshot(&self) -> Option<Vec<Wallpaper>> {
        match &*self.slot.lock() {
            Slot::Uninitialized => None,
            Slot::Empty => Some(Vec::new()),
            Slot::Populated(items) => Some(items.iter().cloned().collect()),
        }
    }
}

impl Default for RotationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn wallpapers(ids: &[&str]) -> Vec<Wallpaper> {
        ids.iter().map(|id| Wallpaper::new(*id)).collect()
    }

    fn ids(cache: &RotationCache) -> Vec<String> {
        cache
            .snapshot()
            .unwrap_or_default()
            .into_iter()
            .map(|wp| wp.id)
            .collect()
    }

    /// Exactly one of the three states holds.
    fn assert_exclusive(cache: &RotationCache) {
        let uninit = cache.is_uninitialized();
        let populated = cache.is_populated();
        let empty = !uninit && !populated;
        assert_eq!([uninit, empty, populated].iter().filter(|s| **s).count(), 1);
        let expected = if uninit {
            CacheState::Uninitialized
        } else if populated {
            CacheState::Populated
        } else {
            CacheState::Empty
        };
        assert_eq!(cache.state(), expected);
    }

    #[tokio::test]
    async fn test_rotation_wraps_around() {
        let cache = RotationCache::new();
        cache.replace(wallpapers(&["w1", "w2", "w3"]));

        assert_eq!(cache.current().await.unwrap().id, "w1");
        assert_eq!(cache.advance().await.unwrap().id, "w2");
        assert_eq!(cache.advance().await.unwrap().id, "w3");
        assert_eq!(cache.advance().await.unwrap().id, "w1");
    }

    #[tokio::test]
    async fn test_fresh_cache_is_empty_error() {
        let cache = RotationCache::new();
        assert!(cache.is_uninitialized());
        assert!(matches!(cache.current().await, Err(CarouselError::EmptyCache)));
        assert!(matches!(cache.advance().await, Err(CarouselError::EmptyCache)));
        assert!(matches!(cache.count().await, Err(CarouselError::EmptyCache)));
    }

    #[tokio::test]
    async fn test_replace_with_nothing() {
        let cache = RotationCache::new();
        cache.replace(Vec::new());

        assert!(!cache.is_uninitialized());
        assert!(!cache.is_populated());
        assert_eq!(cache.state(), CacheState::Empty);
        assert!(matches!(cache.current().await, Err(CarouselError::EmptyCache)));
        assert!(matches!(cache.advance().await, Err(CarouselError::EmptyCache)));
        assert_eq!(cache.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_liked_toggles_in_place() {
        let cache = RotationCache::new();
        cache.replace(wallpapers(&["w1"]));

        cache.set_liked("w1");
        assert!(cache.current().await.unwrap().liked);

        cache.set_liked("missing");
        let wp = cache.current().await.unwrap();
        assert_eq!(wp.id, "w1");
        assert!(wp.liked);

        cache.set_liked("w1");
        assert!(!cache.current().await.unwrap().liked);
    }

    #[tokio::test]
    async fn test_set_liked_keeps_order() {
        let cache = RotationCache::new();
        cache.replace(wallpapers(&["a", "b", "c"]));
        cache.advance().await.unwrap();

        cache.set_liked("c");
        assert_eq!(ids(&cache), vec!["b", "c", "a"]);
        let liked: Vec<bool> = cache.snapshot().unwrap().iter().map(|wp| wp.liked).collect();
        assert_eq!(liked, vec![false, true, false]);
    }

    #[test]
    fn test_set_liked_uninitialized_is_noop() {
        let cache = RotationCache::new();
        cache.set_liked("w1");
        assert!(cache.is_uninitialized());
        assert!(cache.snapshot().is_none());

        cache.replace(Vec::new());
        cache.set_liked("w1");
        assert_eq!(cache.state(), CacheState::Empty);
    }

    #[tokio::test]
    async fn test_full_cycle_restores_order() {
        for len in 1..=6 {
            let names: Vec<String> = (0..len).map(|i| format!("wp{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let cache = RotationCache::new();
            cache.replace(wallpapers(&refs));

            for _ in 0..len {
                cache.advance().await.unwrap();
            }
            assert_eq!(ids(&cache), names);
        }
    }

    #[tokio::test]
    async fn test_count_tracks_replace_and_evict() {
        let cache = RotationCache::new();
        cache.replace(wallpapers(&["a", "b", "c", "d"]));
        assert_eq!(cache.count().await.unwrap(), 4);

        cache.replace(wallpapers(&["e"]));
        assert_eq!(cache.count().await.unwrap(), 1);
        assert!(!cache.contains("a"));

        cache.evict_all();
        assert!(matches!(cache.count().await, Err(CarouselError::EmptyCache)));
    }

    #[test]
    fn test_contains() {
        let cache = RotationCache::new();
        assert!(!cache.contains("w1"));

        cache.replace(wallpapers(&["w1", "w2"]));
        assert!(cache.contains("w2"));
        assert!(!cache.contains("w3"));
    }

    #[test]
    fn test_evict_all_is_idempotent() {
        let cache = RotationCache::new();
        cache.evict_all();
        assert!(cache.is_uninitialized());

        cache.replace(wallpapers(&["w1"]));
        cache.evict_all();
        cache.evict_all();
        assert!(cache.is_uninitialized());
        assert!(!cache.contains("w1"));
    }

    #[tokio::test]
    async fn test_states_stay_exclusive() {
        let cache = RotationCache::new();
        assert_exclusive(&cache);

        cache.replace(wallpapers(&["a", "b"]));
        assert_exclusive(&cache);
        cache.advance().await.unwrap();
        assert_exclusive(&cache);
        cache.set_liked("a");
        assert_exclusive(&cache);
        cache.replace(Vec::new());
        assert_exclusive(&cache);
        cache.set_liked("a");
        assert_exclusive(&cache);
        let _ = cache.advance().await;
        assert_exclusive(&cache);
        cache.evict_all();
        assert_exclusive(&cache);
        cache.replace(wallpapers(&["c"]));
        assert_exclusive(&cache);
    }

    #[tokio::test]
    async fn test_query_reruns_against_current_state() {
        let cache = RotationCache::new();
        cache.replace(wallpapers(&["a", "b"]));
        let first = cache.current();
        cache.replace(wallpapers(&["z"]));
        // futures are lazy: the read happens on await, after the swap
        assert_eq!(first.await.unwrap().id, "z");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_advances_preserve_contents() {
        let cache = Arc::new(RotationCache::new());
        cache.replace(wallpapers(&["a", "b", "c", "d", "e"]));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    cache.advance().await.unwrap();
                    cache.set_liked("c");
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // 200 advances over 5 items is a whole number of cycles
        assert_eq!(ids(&cache), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(cache.count().await.unwrap(), 5);
    }
}
