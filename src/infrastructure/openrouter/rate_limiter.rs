use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Lowest refill rate accepted; anything smaller is clamped to it.
const MIN_RATE: f64 = 0.001;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter shared by every request of a client
///
/// Capacity equals the refill rate, so a fresh limiter allows one second
/// worth of requests as an immediate burst.
#[derive(Debug, Clone)]
pub struct TokenBucketRateLimiter {
    bucket: Arc<Mutex<Bucket>>,
    /// Maximum token capacity
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
}

impl TokenBucketRateLimiter {
    /// Create a limiter allowing `requests_per_second` sustained requests
    pub fn new(requests_per_second: f64) -> Self {
        let rate = requests_per_second.max(MIN_RATE);
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rate,
                last_refill: Instant::now(),
            })),
            capacity: rate,
            refill_rate: rate,
        }
    }

    /// Wait until a token is available, then consume it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                let available = elapsed.mul_add(self.refill_rate, bucket.tokens).min(self.capacity);
                bucket.last_refill = now;

                if available >= 1.0 {
                    bucket.tokens = available - 1.0;
                    return;
                }

                bucket.tokens = available;
                let tokens_needed = 1.0 - available;
                Duration::from_secs_f64((tokens_needed / self.refill_rate).max(0.01))
            };

            sleep(wait).await;
        }
    }

    /// Current number of available tokens
    #[cfg(test)]
    pub async fn available_tokens(&self) -> f64 {
        let bucket = self.bucket.lock().await;
        let elapsed = bucket.last_refill.elapsed().as_secs_f64();
        elapsed.mul_add(self.refill_rate, bucket.tokens).min(self.capacity)
    }
}
