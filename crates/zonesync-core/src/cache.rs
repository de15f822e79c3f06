// # Memo Caches
//
// Process-lifetime caches with explicit invalidation.
//
// ## Purpose
//
// Providers fetch the same remote listings (zones, record sets) several
// times within one run. These caches make the first call pay for the fetch
// and every later call free, until the caller invalidates the entry.
//
// ## Coherence
//
// - Entries never expire on a timer
// - Invalidation is explicit (`invalidate` / `clear`)
// - A failed fetch leaves the entry unset, so the next call fetches again
// - The lock is held across the fetch: concurrent callers for the same
//   cache wait for the first fetch instead of issuing their own

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::Mutex;

/// A single memoized value
///
/// # Example
///
/// ```rust
/// use zonesync_core::cache::CacheSlot;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), zonesync_core::Error> {
/// let zones: CacheSlot<Vec<String>> = CacheSlot::new();
///
/// let first = zones
///     .get_or_try_fetch(|| async { Ok::<_, zonesync_core::Error>(vec!["example.com.".to_string()]) })
///     .await?;
/// assert_eq!(first.len(), 1);
///
/// zones.invalidate().await;
/// assert!(zones.peek().await.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheSlot<V> {
    inner: Mutex<Option<V>>,
}

impl<V: Clone> CacheSlot<V> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Return the cached value, fetching it first if the slot is empty
    pub async fn get_or_try_fetch<F, Fut, E>(&self, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }

        let value = fetch().await?;
        *guard = Some(value.clone());
        Ok(value)
    }

    /// Current value without fetching
    pub async fn peek(&self) -> Option<V> {
        self.inner.lock().await.clone()
    }

    /// Replace the cached value
    pub async fn set(&self, value: V) {
        *self.inner.lock().await = Some(value);
    }

    /// Drop the cached value so the next read fetches again
    pub async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}

impl<V: Clone> Default for CacheSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized values keyed by `K`
#[derive(Debug)]
pub struct KeyedCache<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Return the value cached for `key`, fetching it first if absent
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: &K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(value) = guard.get(key) {
            return Ok(value.clone());
        }

        let value = fetch().await?;
        guard.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Value cached for `key`, without fetching
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().await.get(key).cloned()
    }

    /// Store a value for `key`
    pub async fn set(&self, key: K, value: V) {
        self.inner.lock().await.insert(key, value);
    }

    /// Drop the entry for `key`
    pub async fn invalidate(&self, key: &K) {
        self.inner.lock().await.remove(key);
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
