//! Memoization of rendered art with single-flight computation.
//!
//! Every distinct [`TransformRequest`] is computed at most once while it
//! stays cached. Concurrent callers for the same key share one in-flight
//! computation; callers for different keys never wait on each other because
//! the map lock is only held to look up or insert a slot.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use art_pipeline::{TransformError, TransformOptions};
use axum::body::Bytes;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use sha2::{Digest, Sha256};

use crate::error::RenderError;
use crate::services::image_registry::ImageId;

/// Cache key: which image, transformed how.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformRequest {
    pub image: ImageId,
    pub options: TransformOptions,
}

impl TransformRequest {
    pub fn new(image: ImageId, options: TransformOptions) -> Self {
        Self { image, options }
    }
}

/// A finished output buffer. Cloning is cheap; every clone shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArt {
    bytes: Bytes,
    etag: String,
}

impl RenderedArt {
    pub fn new(bytes: Vec<u8>) -> Self {
        let digest = Sha256::digest(&bytes);
        Self {
            etag: hex::encode(&digest[..16]),
            bytes: Bytes::from(bytes),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Content hash of the bytes, unquoted.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decides which keys stay cached.
///
/// The cache tells the policy about every hit (`touch`), every new entry
/// (`admit`) and every entry it dropped on its own (`forget`). `admit`
/// returns the keys the cache must evict to make room, chosen only among
/// keys for which `evictable` is true. Keys still computing are never
/// evictable, so a policy may stay over its bound until they finish.
pub trait EvictionPolicy<K>: Send {
    fn touch(&mut self, key: &K);
    fn admit(&mut self, key: K, evictable: &dyn Fn(&K) -> bool) -> Vec<K>;
    fn forget(&mut self, key: &K);
}

/// Keep everything forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl<K> EvictionPolicy<K> for Unbounded {
    fn touch(&mut self, _key: &K) {}

    fn admit(&mut self, _key: K, _evictable: &dyn Fn(&K) -> bool) -> Vec<K> {
        Vec::new()
    }

    fn forget(&mut self, _key: &K) {}
}

/// Least recently used, bounded by entry count.
#[derive(Debug)]
pub struct Lru<K> {
    /// Oldest first
    order: VecDeque<K>,
    max_entries: usize,
}

impl<K> Lru<K> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }
}

impl<K: Eq + Send> EvictionPolicy<K> for Lru<K> {
    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn admit(&mut self, key: K, evictable: &dyn Fn(&K) -> bool) -> Vec<K> {
        self.order.push_back(key);

        let mut evicted = Vec::new();
        while self.order.len() > self.max_entries {
            // oldest finished entry; in-flight ones keep their place
            match self.order.iter().position(|k| evictable(k)) {
                Some(pos) => evicted.extend(self.order.remove(pos)),
                None => break,
            }
        }
        evicted
    }

    fn forget(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }
}

type SharedRender = Shared<BoxFuture<'static, Result<RenderedArt, RenderError>>>;

struct CacheState {
    slots: HashMap<TransformRequest, SharedRender>,
    policy: Box<dyn EvictionPolicy<TransformRequest>>,
}

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    /// Lookups that started a computation
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

pub struct RenderCache {
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl RenderCache {
    pub fn new(policy: impl EvictionPolicy<TransformRequest> + 'static) -> Self {
        Self {
            state: Mutex::new(CacheState {
                slots: HashMap::new(),
                policy: Box::new(policy),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// LRU with `max_entries` slots; `0` means unbounded.
    pub fn bounded(max_entries: usize) -> Self {
        if max_entries == 0 {
            Self::unbounded()
        } else {
            Self::new(Lru::new(max_entries))
        }
    }

    pub fn unbounded() -> Self {
        Self::new(Unbounded)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // a panic while holding the lock cannot leave the map half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached output for `key`, computing it with `compute` on
    /// the blocking pool if nobody has yet.
    ///
    /// The computation is spawned eagerly, so it runs to completion and
    /// fills the slot even if every caller stops waiting. A failure is
    /// handed to everyone who waited on it, then the slot is dropped so a
    /// later request can try again.
    pub async fn get_or_compute<F>(
        &self,
        key: TransformRequest,
        compute: F,
    ) -> Result<RenderedArt, RenderError>
    where
        F: FnOnce() -> Result<Vec<u8>, TransformError> + Send + 'static,
    {
        let pending = {
            let mut state = self.lock();
            match state.slots.get(&key).cloned() {
                Some(slot) => {
                    state.policy.touch(&key);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(image = %key.image, "Render cache hit");
                    slot
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(image = %key.image, "Render cache miss");

                    let task = tokio::task::spawn_blocking(compute);
                    let slot = async move {
                        match task.await {
                            Ok(Ok(bytes)) => Ok(RenderedArt::new(bytes)),
                            Ok(Err(e)) => Err(RenderError::Transform(e)),
                            Err(e) => Err(RenderError::Task(e.to_string())),
                        }
                    }
                    .boxed()
                    .shared();
                    // settle the slot even if every caller leaves, so it can be evicted
                    tokio::spawn(slot.clone());

                    let CacheState { slots, policy } = &mut *state;
                    let finished = |k: &TransformRequest| {
                        slots.get(k).is_some_and(|slot| slot.peek().is_some())
                    };
                    for evicted in policy.admit(key.clone(), &finished) {
                        slots.remove(&evicted);
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    slots.insert(key.clone(), slot.clone());
                    slot
                }
            }
        };

        let result = pending.clone().await;

        if let Err(e) = &result {
            let mut state = self.lock();
            // only drop the slot this computation owns
            if state
                .slots
                .get(&key)
                .is_some_and(|slot| slot.ptr_eq(&pending))
            {
                state.slots.remove(&key);
                state.policy.forget(&key);
                tracing::warn!(image = %key.image, error = %e, "Dropping failed render");
            }
        }

        result
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::bounded(256)
    }
}

impl std::fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCache")
            .field("stats", &self.stats())
            .finish()
    }
}
