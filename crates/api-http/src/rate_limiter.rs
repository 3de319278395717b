//! Per-client Rate Limiter (Token Bucket)
//!
//! Cheap admission guard ahead of the queue's own capacity check. Buckets
//! are keyed by peer IP; each holds up to `max_burst` tokens refilled at
//! `rate_per_sec`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

use tokio::sync::Mutex;

/// Upper bound on tracked client buckets. Reaching it triggers eviction, so
/// the map stays bounded no matter how many distinct addresses connect.
const MAX_TRACKED_CLIENTS: usize = 1024;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter with one bucket per client address.
pub struct RateLimiter {
    max_burst: f64,
    rate_per_sec: f64,
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
}

impl RateLimiter {
    /// # Arguments
    /// * `max_burst` - Maximum burst size per client
    /// * `rate_per_sec` - Tokens added per second per client
    pub fn new(max_burst: u32, rate_per_sec: u32) -> Self {
        Self {
            max_burst: max_burst as f64,
            rate_per_sec: rate_per_sec as f64,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a request from `client` is allowed (consumes 1 token).
    pub async fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;

        if !buckets.contains_key(&client) && buckets.len() >= MAX_TRACKED_CLIENTS {
            self.evict(&mut buckets, now);
        }

        let bucket = buckets.entry(client).or_insert(Bucket {
            tokens: self.max_burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.max_burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Make room for a new client bucket.
    ///
    /// A bucket idle long enough to have refilled to `max_burst` carries no
    /// state and is dropped. If every entry is still fresh (an address-churn
    /// flood), the least recently used one goes instead.
    fn evict(&self, buckets: &mut HashMap<IpAddr, Bucket>, now: Instant) {
        buckets.retain(|_, bucket| {
            let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
            bucket.tokens + elapsed * self.rate_per_sec < self.max_burst
        });

        if buckets.len() >= MAX_TRACKED_CLIENTS {
            let oldest = buckets
                .iter()
                .min_by_key(|(_, bucket)| bucket.last_refill)
                .map(|(addr, _)| *addr);
            if let Some(addr) = oldest {
                buckets.remove(&addr);
            }
        }
    }
}
