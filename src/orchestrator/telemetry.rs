//! Per-site telemetry accumulation (spec §4.9, §6 `stats`).

use crate::index_store::SiteStats;
use std::time::{Duration, Instant};

pub struct Telemetry {
    started: Instant,
    request_count: u64,
    response_time_total: Duration,
}

impl Telemetry {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            request_count: 0,
            response_time_total: Duration::ZERO,
        }
    }

    pub fn record_request(&mut self, elapsed: Duration) {
        self.request_count += 1;
        self.response_time_total += elapsed;
    }

    pub fn finish(&self, total_pages: usize, total_words: usize) -> SiteStats {
        let duration = self.started.elapsed().as_secs_f64();
        let average_words = if total_pages > 0 {
            total_words as f64 / total_pages as f64
        } else {
            0.0
        };
        let average_response_time = if self.request_count > 0 {
            self.response_time_total.as_secs_f64() / self.request_count as f64
        } else {
            0.0
        };
        let pages_per_second = if duration > 0.0 {
            total_pages as f64 / duration
        } else {
            0.0
        };

        SiteStats {
            total_pages,
            average_words,
            duration,
            request_count: self.request_count,
            average_response_time,
            pages_per_second,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_computes_averages() {
        let mut telemetry = Telemetry::start();
        telemetry.record_request(Duration::from_millis(100));
        telemetry.record_request(Duration::from_millis(300));
        let stats = telemetry.finish(2, 400);
        assert_eq!(stats.total_pages, 2);
        assert_eq!(stats.average_words, 200.0);
        assert_eq!(stats.request_count, 2);
        assert!((stats.average_response_time - 0.2).abs() < 1e-6);
    }

    #[test]
    fn finish_with_no_requests_is_zeroed() {
        let telemetry = Telemetry::start();
        let stats = telemetry.finish(0, 0);
        assert_eq!(stats.request_count, 0);
        assert_eq!(stats.average_words, 0.0);
    }
}
