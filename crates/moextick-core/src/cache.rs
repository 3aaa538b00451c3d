//! In-memory caching for decoded ISS responses.
//!
//! [`MemoryCache`] is a size-bounded TTL store with LRU eviction that runs at
//! most one load per key at a time: concurrent [`Cache::get_or_set`] callers
//! for a missing key share the outcome of a single loader. [`NullCache`]
//! exposes the same interface, stores nothing and always runs the loader.
//!
//! # Load lifecycle
//!
//! ```text
//! get_or_set(key)
//!   ├── live entry ─────────────▶ return value (touch LRU)
//!   ├── pending load for key ───▶ follower: await shared completion
//!   └── nothing ────────────────▶ initiator: register pending load,
//!                                  spawn loader task, await completion
//! loader task finishes
//!   ├── Ok(value) ──▶ write back, drop pending load, broadcast value
//!   └── Err(error) ─▶ drop pending load, broadcast error
//! ```
//!
//! The loader runs in its own tokio task, so dropping the initiator's future
//! does not cancel the fetch for the callers still waiting on it.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::time::Instant;
use tracing::debug;

use crate::MoexError;

/// Deferred upstream fetch handed to [`Cache::get_or_set`].
///
/// The future is only polled by the caller that becomes the initiator of a
/// load; every other caller drops its loader unpolled.
pub type LoadFuture<V> = BoxFuture<'static, Result<V, MoexError>>;

type Completion<V> = Shared<BoxFuture<'static, Result<V, MoexError>>>;

/// Upper bound for expiry instants when a TTL would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Sizing and expiry settings for a [`MemoryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when a write does not carry its own.
    pub default_ttl: Duration,
    /// Maximum number of stored entries; `None` disables LRU eviction.
    pub max_size: Option<usize>,
}

impl CacheConfig {
    pub const fn new(default_ttl: Duration, max_size: Option<usize>) -> Self {
        Self {
            default_ttl,
            max_size,
        }
    }

    pub const fn unbounded(default_ttl: Duration) -> Self {
        Self::new(default_ttl, None)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Some(1000))
    }
}

/// Cache contract shared by lookup services.
///
/// Implementations are selected when the client is built; services only see
/// `Arc<dyn Cache<V>>`.
pub trait Cache<V>: Send + Sync {
    /// Returns a live value and marks it most recently used.
    fn get(&self, key: &str) -> Option<V>;

    /// Inserts or overwrites `key`; `ttl` overrides the default TTL.
    fn set(&self, key: &str, value: V, ttl: Option<Duration>);

    fn delete(&self, key: &str);

    /// Drops every stored entry. Loads already in flight still complete.
    fn clear(&self);

    /// Returns the cached value for `key`, or resolves it through `loader`
    /// with at most one load per key in flight.
    ///
    /// # Errors
    ///
    /// Every caller waiting on a failed load receives the loader's error.
    fn get_or_set<'a>(
        &'a self,
        key: &'a str,
        loader: LoadFuture<V>,
        ttl: Option<Duration>,
    ) -> Pin<Box<dyn Future<Output = Result<V, MoexError>> + Send + 'a>>;
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
    tick: u64,
}

struct PendingLoad<V> {
    id: u64,
    completion: Completion<V>,
}

/// Entry store, recency index and pending-load table.
///
/// `entries` and `recency` always hold the same key set: every mutation goes
/// through `insert`, `remove`, `lookup` or `clear`.
struct Store<V> {
    entries: HashMap<String, Entry<V>>,
    recency: BTreeMap<u64, String>,
    pending: HashMap<String, PendingLoad<V>>,
    clock: u64,
    load_ids: u64,
}

impl<V: Clone> Store<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            pending: HashMap::new(),
            clock: 0,
            load_ids: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn next_load_id(&mut self) -> u64 {
        self.load_ids += 1;
        self.load_ids
    }

    fn lookup(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = now > self.entries.get(key)?.expires_at;
        if expired {
            self.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }

        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, key.to_owned());
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: &str, value: V, expires_at: Instant, max_size: Option<usize>) {
        let tick = self.next_tick();
        let entry = Entry {
            value,
            expires_at,
            tick,
        };
        if let Some(previous) = self.entries.insert(key.to_owned(), entry) {
            self.recency.remove(&previous.tick);
        }
        self.recency.insert(tick, key.to_owned());

        if let Some(max_size) = max_size {
            while self.entries.len() > max_size {
                let Some((_, oldest)) = self.recency.pop_first() else {
                    break;
                };
                self.entries.remove(&oldest);
                debug!(key = %oldest, "evicted least recently used entry");
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.recency.remove(&entry.tick);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired = self
            .entries
            .iter()
            .filter(|(_, entry)| now > entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Publishes a finished load: unregisters it and stores a successful value.
    ///
    /// The write-back happens even if the key was deleted or the cache was
    /// cleared while the load was running.
    fn finish_load(
        &mut self,
        key: &str,
        id: u64,
        outcome: &Result<V, MoexError>,
        ttl: Duration,
        max_size: Option<usize>,
    ) {
        if self.pending.get(key).is_some_and(|pending| pending.id == id) {
            self.pending.remove(key);
        }

        match outcome {
            Ok(value) => {
                let now = Instant::now();
                self.insert(key, value.clone(), expiry(now, ttl), max_size);
                debug!(key, load_id = id, "load stored");
            }
            Err(error) => {
                debug!(key, load_id = id, code = error.code(), "load failed; nothing stored");
            }
        }
    }
}

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

fn lock<V>(store: &Mutex<Store<V>>) -> MutexGuard<'_, Store<V>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Begin<V> {
    Hit(V),
    Wait(Completion<V>),
}

/// Thread-safe in-memory TTL cache with LRU eviction and request coalescing.
pub struct MemoryCache<V> {
    config: CacheConfig,
    store: Arc<Mutex<Store<V>>>,
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(Store::new())),
        }
    }

    pub const fn config(&self) -> CacheConfig {
        self.config
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        lock(&self.store).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads currently in flight.
    pub fn pending_loads(&self) -> usize {
        lock(&self.store).pending.len()
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        lock(&self.store).purge_expired(Instant::now())
    }

    fn begin(&self, key: &str, loader: LoadFuture<V>, ttl: Option<Duration>) -> Begin<V> {
        let mut store = lock(&self.store);
        if let Some(value) = store.lookup(key, Instant::now()) {
            debug!(key, "cache hit");
            return Begin::Hit(value);
        }

        if let Some(pending) = store.pending.get(key) {
            debug!(key, load_id = pending.id, "joining in-flight load");
            return Begin::Wait(pending.completion.clone());
        }

        let id = store.next_load_id();
        debug!(key, load_id = id, "cache miss; starting load");
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let completion = self.spawn_load(key.to_owned(), id, loader, ttl);
        store.pending.insert(
            key.to_owned(),
            PendingLoad {
                id,
                completion: completion.clone(),
            },
        );
        Begin::Wait(completion)
    }

    /// Runs `loader` on its own task and returns the completion every waiter
    /// shares.
    ///
    /// Must be called with the store locked so the pending load is registered
    /// before the task can publish its outcome.
    fn spawn_load(
        &self,
        key: String,
        id: u64,
        loader: LoadFuture<V>,
        ttl: Duration,
    ) -> Completion<V> {
        let max_size = self.config.max_size;
        let task_store = Arc::clone(&self.store);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(loader).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(MoexError::internal(format!(
                    "loader for '{task_key}' panicked"
                ))),
            };
            lock(&task_store).finish_load(&task_key, id, &outcome, ttl, max_size);
            outcome
        });

        let store = Arc::clone(&self.store);
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let outcome = Err(MoexError::cancelled(format!(
                        "load for '{key}' did not complete: {join_error}"
                    )));
                    lock(&store).finish_load(&key, id, &outcome, ttl, max_size);
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        lock(&self.store).lookup(key, Instant::now())
    }

    fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let expires_at = expiry(Instant::now(), ttl.unwrap_or(self.config.default_ttl));
        lock(&self.store).insert(key, value, expires_at, self.config.max_size);
    }

    fn delete(&self, key: &str) {
        if lock(&self.store).remove(key) {
            debug!(key, "cache entry deleted");
        }
    }

    fn clear(&self) {
        lock(&self.store).clear();
        debug!("cache cleared");
    }

    fn get_or_set<'a>(
        &'a self,
        key: &'a str,
        loader: LoadFuture<V>,
        ttl: Option<Duration>,
    ) -> Pin<Box<dyn Future<Output = Result<V, MoexError>> + Send + 'a>> {
        Box::pin(async move {
            let completion = match self.begin(key, loader, ttl) {
                Begin::Hit(value) => return Ok(value),
                Begin::Wait(completion) => completion,
            };
            completion.await
        })
    }
}

/// Cache stand-in used when caching is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl<V> Cache<V> for NullCache
where
    V: Send + 'static,
{
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: &str, _value: V, _ttl: Option<Duration>) {}

    fn delete(&self, _key: &str) {}

    fn clear(&self) {}

    fn get_or_set<'a>(
        &'a self,
        _key: &'a str,
        loader: LoadFuture<V>,
        _ttl: Option<Duration>,
    ) -> Pin<Box<dyn Future<Output = Result<V, MoexError>> + Send + 'a>> {
        loader
    }
}
