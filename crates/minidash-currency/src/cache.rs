//! Short-lived in-memory rate cache.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Source of "now" for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedRate {
    rate: f64,
    fetched_at: DateTime<Utc>,
}

/// Rates keyed by ordered `(from, to)` pair.
///
/// An entry is usable while `now - fetched_at < ttl`. Expired entries stay
/// in the map until the pair is fetched again and overwritten.
#[derive(Debug)]
pub struct RateCache {
    ttl: Duration,
    entries: HashMap<(String, String), CachedRate>,
}

impl RateCache {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500)),
            entries: HashMap::new(),
        }
    }

    /// Cached rate for `from -> to` if it is still fresh at `now`
    pub fn get_fresh(&self, from: &str, to: &str, now: DateTime<Utc>) -> Option<f64> {
        let entry = self.entries.get(&(from.to_string(), to.to_string()))?;
        if now.signed_duration_since(entry.fetched_at) < self.ttl {
            Some(entry.rate)
        } else {
            None
        }
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: f64, fetched_at: DateTime<Utc>) {
        self.entries.insert(
            (from.to_string(), to.to_string()),
            CachedRate { rate, fetched_at },
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: parking_lot::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: parking_lot::Mutex::new(start),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> RateCache {
        RateCache::new(std::time::Duration::from_secs(300))
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.insert("EUR", "USD", 1.08, t0);

        assert_eq!(cache.get_fresh("EUR", "USD", t0), Some(1.08));
        assert_eq!(
            cache.get_fresh("EUR", "USD", t0 + Duration::seconds(299)),
            Some(1.08)
        );
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.insert("EUR", "USD", 1.08, t0);

        assert_eq!(cache.get_fresh("EUR", "USD", t0 + Duration::seconds(300)), None);
        assert_eq!(cache.get_fresh("EUR", "USD", t0 + Duration::minutes(10)), None);
    }

    #[test]
    fn test_key_is_ordered_pair() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.insert("EUR", "USD", 1.08, t0);

        assert_eq!(cache.get_fresh("USD", "EUR", t0), None);
    }

    #[test]
    fn test_insert_overwrites_and_refreshes() {
        let mut cache = cache();
        let t0 = Utc::now();
        cache.insert("EUR", "USD", 1.08, t0);
        let t1 = t0 + Duration::seconds(400);
        cache.insert("EUR", "USD", 1.10, t1);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_fresh("EUR", "USD", t1), Some(1.10));
    }

    #[test]
    fn test_manual_clock_advances() {
        let t0 = Utc::now();
        let clock = ManualClock::new(t0);
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), t0 + Duration::seconds(5));
    }
}
