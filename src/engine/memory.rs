use std::time::{Duration, Instant};

use tracing::debug;

use crate::field::attribute_cache::AttributeCache;

/// Delay between the end of a pass and the cache clear it schedules.
pub const CLEANUP_DEBOUNCE: Duration = Duration::from_millis(500);

/// Interval of the background eviction.
pub const PERIODIC_EVICTION: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTrigger {
    Debounced,
    Periodic,
    Idle,
}

// ============================================================================
// MemoryManager
// ============================================================================

/// Owns the attribute cache between passes and decides when to clear it.
///
/// Time is always passed in, so the schedule is driven by whoever owns the
/// event loop (or a test) rather than by real timers. While a pass holds
/// the cache no eviction happens; a due cleanup waits for `release`.
#[derive(Debug)]
pub struct MemoryManager {
    cache: Option<AttributeCache>,
    debounce: Duration,
    period: Duration,
    cleanup_due: Option<Instant>,
    next_periodic: Option<Instant>,
    evictions: u64,
    destroyed: bool,
}

impl MemoryManager {
    pub fn new(now: Instant) -> Self {
        Self::with_intervals(now, CLEANUP_DEBOUNCE, PERIODIC_EVICTION)
    }

    pub fn with_intervals(now: Instant, debounce: Duration, period: Duration) -> Self {
        Self {
            cache: Some(AttributeCache::new()),
            debounce,
            period,
            cleanup_due: None,
            next_periodic: Some(now + period),
            evictions: 0,
            destroyed: false,
        }
    }

    /// Hand the cache to a pass. A destroyed manager hands out a fresh,
    /// untracked cache.
    pub fn acquire(&mut self) -> AttributeCache {
        self.cache.take().unwrap_or_default()
    }

    /// Take the cache back from a pass and schedule its cleanup.
    pub fn release(&mut self, cache: AttributeCache, now: Instant) {
        if self.destroyed {
            return;
        }
        self.cache = Some(cache);
        self.schedule_cleanup(now);
    }

    /// (Re)arm the debounced cleanup; repeated calls push the deadline out.
    pub fn schedule_cleanup(&mut self, now: Instant) {
        if !self.destroyed {
            self.cleanup_due = Some(now + self.debounce);
        }
    }

    /// Run whatever is due at `now`. Returns what fired, if anything.
    pub fn poll(&mut self, now: Instant) -> Option<CleanupTrigger> {
        if self.destroyed || self.cache.is_none() {
            return None;
        }
        if self.cleanup_due.is_some_and(|due| now >= due) {
            self.cleanup_due = None;
            self.evict(CleanupTrigger::Debounced);
            return Some(CleanupTrigger::Debounced);
        }
        if self.next_periodic.is_some_and(|due| now >= due) {
            self.next_periodic = Some(now + self.period);
            self.evict(CleanupTrigger::Periodic);
            return Some(CleanupTrigger::Periodic);
        }
        None
    }

    /// Page hidden or idle: clear right away and drop the pending cleanup.
    pub fn on_idle(&mut self) -> Option<CleanupTrigger> {
        if self.destroyed || self.cache.is_none() {
            return None;
        }
        self.cleanup_due = None;
        self.evict(CleanupTrigger::Idle);
        Some(CleanupTrigger::Idle)
    }

    /// Stop all scheduling and drop the cache for good.
    pub fn destroy(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
        self.cache = None;
        self.cleanup_due = None;
        self.next_periodic = None;
        self.destroyed = true;
    }

    pub fn cleanup_pending(&self) -> bool {
        self.cleanup_due.is_some()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.as_ref().map_or(0, AttributeCache::len)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn evict(&mut self, trigger: CleanupTrigger) {
        if let Some(cache) = self.cache.as_mut() {
            debug!(?trigger, entries = cache.len(), "attribute cache cleared");
            cache.clear();
            self.evictions += 1;
        }
    }
}

// ============================================================================
// FillSession: scoped cache acquisition
// ============================================================================

/// Holds the cache for the length of one pass. Dropping the session gives
/// the cache back and schedules cleanup at the current instant.
pub struct FillSession<'m> {
    memory: &'m mut MemoryManager,
    cache: Option<AttributeCache>,
}

impl<'m> FillSession<'m> {
    pub fn begin(memory: &'m mut MemoryManager) -> Self {
        let cache = memory.acquire();
        Self {
            memory,
            cache: Some(cache),
        }
    }

    pub fn cache(&mut self) -> &mut AttributeCache {
        self.cache.get_or_insert_with(AttributeCache::new)
    }

    /// Release with an explicit instant.
    pub fn finish(mut self, now: Instant) {
        if let Some(cache) = self.cache.take() {
            self.memory.release(cache, now);
        }
    }
}

impl Drop for FillSession<'_> {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.take() {
            self.memory.release(cache, Instant::now());
        }
    }
}
