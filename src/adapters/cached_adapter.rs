//! Memoizing decorator over any [`DataPort`].
//!
//! Entries are keyed by [`PriceQuery`] and hold the validated
//! [`PriceSeries`] behind an `Arc`, so every hit for a key observes the same
//! table for as long as the entry lives. Failed fetches are not stored.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::domain::error::StockdashError;
use crate::domain::metrics::build_series;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::domain::query::PriceQuery;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep every entry for the lifetime of the process.
    #[default]
    Never,
    /// Hold at most this many entries; the oldest insertion goes first.
    MaxEntries(usize),
}

impl EvictionPolicy {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockdashError> {
        let name = config
            .get_string("cache", "eviction")
            .unwrap_or_else(|| "never".to_string());
        match name.trim().to_lowercase().as_str() {
            "never" => Ok(EvictionPolicy::Never),
            "max_entries" => {
                let n = config.get_int("cache", "max_entries", 0);
                if n < 1 {
                    return Err(StockdashError::ConfigInvalid {
                        section: "cache".into(),
                        key: "max_entries".into(),
                        reason: "max_entries must be at least 1".into(),
                    });
                }
                Ok(EvictionPolicy::MaxEntries(n as usize))
            }
            other => Err(StockdashError::ConfigInvalid {
                section: "cache".into(),
                key: "eviction".into(),
                reason: format!("unknown eviction policy '{}'", other),
            }),
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<PriceQuery, Arc<PriceSeries>>,
    order: VecDeque<PriceQuery>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct CachedDataPort<P> {
    inner: P,
    policy: EvictionPolicy,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P, policy: EvictionPolicy) -> Self {
        Self {
            inner,
            policy,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validated series for `query`, fetched once per key.
    pub fn get_series(&self, query: &PriceQuery) -> Result<Arc<PriceSeries>, StockdashError> {
        if let Some(hit) = self.lock().entries.get(query).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(symbol = %query.symbol, start = %query.start, end = %query.end, "cache hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(
            symbol = %query.symbol,
            start = %query.start,
            end = %query.end,
            provider = self.inner.name(),
            "cache miss"
        );

        let bars = self.inner.fetch_daily(query)?;
        let series = Arc::new(build_series(&query.symbol, bars)?);

        let mut state = self.lock();
        if let Some(existing) = state.entries.get(query) {
            // Another caller stored this key while we were fetching.
            return Ok(Arc::clone(existing));
        }

        if let EvictionPolicy::MaxEntries(max) = self.policy {
            while state.entries.len() >= max.max(1) {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                        debug!(symbol = %oldest.symbol, "evicted cache entry");
                    }
                    None => break,
                }
            }
        }

        state.entries.insert(query.clone(), Arc::clone(&series));
        state.order.push_back(query.clone());
        Ok(series)
    }

    pub fn contains(&self, query: &PriceQuery) -> bool {
        self.lock().entries.contains_key(query)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().entries.len(),
        }
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_daily(&self, query: &PriceQuery) -> Result<Vec<OhlcvBar>, StockdashError> {
        self.get_series(query).map(|s| s.bars().to_vec())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn source(&self) -> &str {
        self.inner.source()
    }
}
