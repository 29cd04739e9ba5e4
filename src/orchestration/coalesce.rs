//! Request coalescing for quote fetches.
//!
//! Concurrent quote requests for the same logical input within a short
//! window share one result instead of issuing duplicate external reads. A
//! per-key generation counter decides "latest wins": a newer request for
//! the same input supersedes an older in-flight one, whose result is then
//! dropped rather than applied.

use crate::domain::{Clock, Quote, QuoteRequest, TimeMs};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct Entry {
    generation: u64,
    result: Option<(TimeMs, Quote)>,
}

/// Keyed short-TTL quote cache with latest-wins generations.
pub struct QuoteCoalescer {
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<QuoteRequest, Entry>>,
}

impl QuoteCoalescer {
    pub fn new(clock: Arc<dyn Clock>, ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh cached quote for this input, if one exists.
    pub fn cached(&self, key: &QuoteRequest) -> Option<Quote> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        let (stored_at, quote) = entries.get(key)?.result.as_ref()?;
        if now.since(*stored_at) < self.ttl_ms {
            Some(quote.clone())
        } else {
            None
        }
    }

    /// Start a computation for this input and obtain its generation.
    pub fn begin(&self, key: &QuoteRequest) -> u64 {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.clone()).or_default();
        entry.generation += 1;
        entry.generation
    }

    /// Apply a finished computation. Returns true when this generation is
    /// still the latest and the result was applied.
    ///
    /// A superseded result is never applied, but it may still fill an
    /// empty cache slot: the underlying read completed anyway, and the
    /// value is valid for identical future requests.
    pub fn complete(&self, key: &QuoteRequest, generation: u64, quote: Quote) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.clone()).or_default();
        if generation == entry.generation {
            entry.result = Some((now, quote));
            return true;
        }
        debug!(
            "Dropping stale quote result (generation {} < {})",
            generation, entry.generation
        );
        if entry.result.is_none() {
            entry.result = Some((now, quote));
        }
        false
    }

    /// Advisory cancellation: stop the pending computation's result from
    /// being applied. The underlying I/O may still complete and populate
    /// the cache for reuse.
    pub fn cancel(&self, key: &QuoteRequest) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.generation += 1;
        }
    }
}

impl std::fmt::Debug for QuoteCoalescer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteCoalescer")
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}
