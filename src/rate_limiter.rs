//! Process-global token-bucket rate limiter for outbound HTTP (spec §4.1).
//!
//! A single bucket is shared across every fetch in the run — this is the
//! sole cross-site coordination point when sites are crawled in parallel
//! (spec §5). Contention is a non-issue at `r`-per-second rates, so the
//! bucket is guarded by a plain `parking_lot::Mutex` rather than anything
//! lock-free; the teacher's per-domain atomic-packed-state trick
//! (`crawl_engine::rate_limiter`) is overkill for one global bucket and is
//! not reproduced here.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
    cancel: Notify,
    cancelled: std::sync::atomic::AtomicBool,
}

impl RateLimiter {
    pub fn new(rate: f64, burst: f64) -> Self {
        Self {
            rate,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
            cancel: Notify::new(),
            cancelled: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn defaults() -> Self {
        Self::new(2.0, 5.0)
    }

    /// Signal cancellation: any acquirer currently waiting returns promptly
    /// without consuming a token; future acquires return immediately too.
    pub fn cancel(&self) {
        self.cancelled
            .store(true, std::sync::atomic::Ordering::SeqCst);
        self.cancel.notify_waiters();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Block until a token is available, or return `false` immediately if
    /// the run was cancelled (the caller must not proceed with the fetch).
    pub async fn acquire(&self) -> bool {
        loop {
            if self.is_cancelled() {
                return false;
            }

            let wait = {
                let mut bucket = self.bucket.lock();
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    Some(Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate))
                }
            };

            match wait {
                None => return true,
                Some(duration) => {
                    tokio::select! {
                        _ = tokio::time::sleep(duration) => {}
                        _ = self.cancel.notified() => {
                            if self.is_cancelled() {
                                return false;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_is_immediately_available() {
        let limiter = RateLimiter::new(1.0, 3.0);
        for _ in 0..3 {
            assert!(limiter.acquire().await);
        }
    }

    #[tokio::test]
    async fn fourth_acquire_waits() {
        let limiter = RateLimiter::new(1000.0, 1.0);
        assert!(limiter.acquire().await);
        let start = Instant::now();
        assert!(limiter.acquire().await);
        // rate=1000/s means wait should be on the order of ~1ms, not zero.
        assert!(start.elapsed() >= Duration::from_micros(200));
    }

    #[tokio::test]
    async fn cancellation_returns_false_without_consuming() {
        let limiter = RateLimiter::new(0.001, 1.0);
        assert!(limiter.acquire().await); // drains the single token
        limiter.cancel();
        assert!(!limiter.acquire().await);
    }
}
