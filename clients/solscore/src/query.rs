//! Read-side cache and per-query state tracking.
//!
//! Entries are keyed by operation + parameters, last write wins, and are
//! served until they are older than the configured stale time. Nothing
//! refetches on its own; callers refetch explicitly.

use anchor_lang::prelude::Pubkey;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::ClientError;
use crate::state::{BetView, MarketView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Market(Pubkey),
    AllMarkets,
    UserBets(Pubkey),
    MarketBets(Pubkey),
    Bet { user: Pubkey, market: Pubkey },
}

impl QueryKey {
    /// Whether a mutation of `market` can change what this key returns
    pub fn touches_market(&self, market: &Pubkey) -> bool {
        match self {
            QueryKey::Market(m) | QueryKey::MarketBets(m) => m == market,
            QueryKey::Bet { market: m, .. } => m == market,
            QueryKey::AllMarkets | QueryKey::UserBets(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Market(Option<MarketView>),
    Markets(Vec<MarketView>),
    Bet(Option<BetView>),
    Bets(Vec<BetView>),
}

struct CacheEntry {
    value: CachedValue,
    fetched_at: Instant,
}

pub struct QueryCache {
    stale_time: Duration,
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value if it is still fresh
    pub fn get(&self, key: &QueryKey) -> Option<CachedValue> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.value.clone())
    }

    pub fn put(&self, key: QueryKey, value: CachedValue) {
        self.entries.write().insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.write().remove(key);
    }

    pub fn invalidate_market(&self, market: &Pubkey) {
        self.entries.write().retain(|key, _| !key.touches_market(market));
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// idle -> loading -> success | error, and back to loading on refetch
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Success(T),
    Error(ClientError),
}

#[derive(Debug, Clone)]
pub struct Query<T> {
    state: QueryState<T>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Query<T> {
    pub fn new() -> Self {
        Self {
            state: QueryState::Idle,
        }
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, QueryState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.state, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match &self.state {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Drive one fetch through the state machine
    pub async fn run<F>(&mut self, fetch: F) -> &QueryState<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.state = QueryState::Loading;
        self.state = match fetch.await {
            Ok(data) => QueryState::Success(data),
            Err(err) => QueryState::Error(err),
        };
        &self.state
    }
}

impl<T: Clone + Default> Query<T> {
    /// What a list view renders: the data, or empty while loading / on error
    pub fn data_or_default(&self) -> T {
        self.data().cloned().unwrap_or_default()
    }
}
