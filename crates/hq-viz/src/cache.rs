//! Keyed memoization of fetch results.
//!
//! One [`DataCache`] is shared by every controller that needs the same
//! payload kind, so a dependency identity is fetched at most once for the
//! lifetime of the cache:
//! - hits resolve on the first poll without touching the data source
//! - concurrent misses for one key join a single in-flight fetch
//! - failures are not stored; the next request retries

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::dependency::DependencyKey;
use crate::error::FetchResult;

type Fetcher<K, P> = Rc<dyn Fn(&K) -> LocalBoxFuture<'static, FetchResult<P>>>;
type InFlight<P> = Shared<LocalBoxFuture<'static, FetchResult<Rc<P>>>>;

/// Counters describing how a cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from a stored entry.
    pub hits: u64,
    /// Requests with no stored entry.
    pub misses: u64,
    /// Underlying fetches issued.
    pub fetches: u64,
    /// Underlying fetches that failed.
    pub failures: u64,
}

struct CacheInner<K, P> {
    entries: HashMap<K, Rc<P>>,
    in_flight: HashMap<K, InFlight<P>>,
    stats: CacheStats,
}

/// Shared keyed cache in front of an asynchronous data source.
///
/// Cloning is cheap; clones share entries.
pub struct DataCache<K, P> {
    name: Rc<str>,
    fetcher: Fetcher<K, P>,
    inner: Rc<RefCell<CacheInner<K, P>>>,
}

impl<K, P> Clone for DataCache<K, P> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            fetcher: Rc::clone(&self.fetcher),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, P> Debug for DataCache<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("DataCache")
            .field("name", &self.name)
            .field("entries", &inner.entries.len())
            .field("in_flight", &inner.in_flight.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

impl<K, P> DataCache<K, P>
where
    K: Clone + Eq + Hash + Debug + 'static,
    P: 'static,
{
    /// Create a cache named `name` (used in logs) over `fetcher`.
    pub fn new<F>(name: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn(&K) -> LocalBoxFuture<'static, FetchResult<P>> + 'static,
    {
        let name: String = name.into();
        Self {
            name: Rc::from(name),
            fetcher: Rc::new(fetcher),
            inner: Rc::new(RefCell::new(CacheInner {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                stats: CacheStats::default(),
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload for `key`, fetching it only if it is not cached yet.
    pub fn fetch(&self, key: &K) -> LocalBoxFuture<'static, FetchResult<Rc<P>>> {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(payload) = inner.entries.get(key).cloned() {
                inner.stats.hits += 1;
                debug!(cache = %self.name, ?key, "cache hit");
                return future::ready(Ok(payload)).boxed_local();
            }
            inner.stats.misses += 1;
            if let Some(pending) = inner.in_flight.get(key).cloned() {
                debug!(cache = %self.name, ?key, "joining in-flight fetch");
                return pending.boxed_local();
            }
            inner.stats.fetches += 1;
        }

        info!(cache = %self.name, ?key, "fetching");
        let request = (self.fetcher)(key);
        let weak = Rc::downgrade(&self.inner);
        let name = Rc::clone(&self.name);
        let owned_key = key.clone();

        let pending: InFlight<P> = async move {
            let result = request.await.map(Rc::new);
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.in_flight.remove(&owned_key);
                match &result {
                    Ok(payload) => {
                        debug!(cache = %name, key = ?owned_key, "stored");
                        inner.entries.insert(owned_key, Rc::clone(payload));
                    }
                    Err(err) => {
                        inner.stats.failures += 1;
                        warn!(cache = %name, key = ?owned_key, error = %err, "fetch failed, not cached");
                    }
                }
            }
            result
        }
        .boxed_local()
        .shared();

        self.inner
            .borrow_mut()
            .in_flight
            .insert(key.clone(), pending.clone());
        pending.boxed_local()
    }

    /// Data-source closure for a controller whose dependency is keyed by `K`.
    pub fn source<D>(
        &self,
    ) -> impl Fn(&D) -> LocalBoxFuture<'static, FetchResult<Rc<P>>> + use<K, P, D>
    where
        D: DependencyKey<Key = K> + 'static,
    {
        let cache = self.clone();
        move |dependency: &D| cache.fetch(&dependency.key())
    }

    /// Stored payload for `key`, without fetching.
    pub fn get(&self, key: &K) -> Option<Rc<P>> {
        self.inner.borrow().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Drop the entry for `key`; the next request refetches.
    pub fn invalidate(&self, key: &K) -> bool {
        self.inner.borrow_mut().entries.remove(key).is_some()
    }

    /// Drop every stored entry. In-flight fetches still complete and store.
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.borrow().stats
    }
}
