use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{error, trace};

/// Keyed response cache whose entries expire after a fixed time-to-live.
/// A zero TTL disables caching.
pub struct TtlCache<T> {
    name: &'static str,
    ttl: Duration,
    entries: RwLock<HashMap<String, (T, Instant)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("{}: cache lock poisoned during read, recovering", self.name);
                poisoned.into_inner()
            }
        };

        match entries.get(key) {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => {
                trace!("{}: cache HIT for {}", self.name, key);
                Some(value.clone())
            }
            _ => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: T) {
        if self.ttl.is_zero() {
            return;
        }

        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("{}: cache lock poisoned during write, recovering", self.name);
                poisoned.into_inner()
            }
        };

        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        entries.insert(key.into(), (value, Instant::now()));
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = TtlCache::new("test", Duration::from_secs(60));
        cache.insert("AAPL:6mo", 42);
        assert_eq!(cache.get("AAPL:6mo"), Some(42));
        assert_eq!(cache.get("MSFT:6mo"), None);
    }

    #[test]
    fn test_zero_ttl_never_stores() {
        let cache = TtlCache::new("test", Duration::ZERO);
        cache.insert("AAPL", 1);
        assert_eq!(cache.get("AAPL"), None);
    }

    #[test]
    fn test_entries_expire() {
        let cache = TtlCache::new("test", Duration::from_millis(20));
        cache.insert("AAPL", "bars".to_string());
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("AAPL"), None);
    }
}
