//! Priority Fee Cache
//!
//! Holds the last priority-fee suggestion (micro-lamports per compute unit)
//! fetched from a provider. A value is fresh for a fixed window; past that the
//! owner must try a refresh, and if the refresh fails it may still serve the
//! stale value. When nothing was ever cached the fallback default applies.

use std::time::Duration;
use tokio::time::Instant;

/// Freshness window of a cached suggestion
pub const PRIORITY_FEE_TTL: Duration = Duration::from_secs(10);

/// Fee served when no suggestion has ever been fetched
pub const DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS: u64 = 100_000;

#[derive(Debug, Clone, Copy)]
struct CachedFee {
    value: u64,
    fetched_at: Instant,
}

#[derive(Debug, Clone)]
pub struct PriorityFeeCache {
    ttl: Duration,
    fallback: u64,
    entry: Option<CachedFee>,
}

impl Default for PriorityFeeCache {
    fn default() -> Self {
        Self::new(PRIORITY_FEE_TTL, DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS)
    }
}

impl PriorityFeeCache {
    pub fn new(ttl: Duration, fallback: u64) -> Self {
        Self {
            ttl,
            fallback,
            entry: None,
        }
    }

    /// Cached value if it is younger than the TTL
    pub fn fresh(&self) -> Option<u64> {
        self.entry
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.value)
    }

    /// Cached value regardless of age
    pub fn stale(&self) -> Option<u64> {
        self.entry.map(|e| e.value)
    }

    pub fn store(&mut self, value: u64) {
        self.entry = Some(CachedFee {
            value,
            fetched_at: Instant::now(),
        });
    }

    /// Value to serve after a failed refresh: stale entry, else the fallback.
    pub fn on_refresh_failure(&self) -> u64 {
        self.stale().unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> u64 {
        self.fallback
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
