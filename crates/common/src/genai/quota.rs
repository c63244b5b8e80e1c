//! Sliding-window request quota for the generative endpoint
//!
//! A single process-wide budget, not per-user: the target is protecting the
//! upstream API quota, not request fairness. Timestamps are kept in insertion
//! order, so pruning is a prefix trim.

use crate::metrics;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Window length for the quota
const WINDOW: Duration = Duration::from_secs(60);

/// Fixed sliding-window counter: at most `max_requests` admissions per
/// rolling 60 seconds. Bursts up to the limit are allowed, no smoothing.
pub struct RequestQuota {
    max_requests: usize,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RequestQuota {
    pub fn new(max_requests: usize) -> Self {
        Self {
            max_requests,
            stamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Try to admit one request now. On admission the attempt is recorded
    /// immediately, so a granted slot is consumed even if the caller's
    /// request later fails.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Remaining capacity in the current window
    pub fn remaining(&self) -> usize {
        self.remaining_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut stamps = self.stamps.lock().expect("quota window poisoned");

        Self::prune(&mut stamps, now);

        if stamps.len() < self.max_requests {
            stamps.push_back(now);
            true
        } else {
            metrics::record_quota_denied();
            false
        }
    }

    fn remaining_at(&self, now: Instant) -> usize {
        let mut stamps = self.stamps.lock().expect("quota window poisoned");
        Self::prune(&mut stamps, now);
        self.max_requests.saturating_sub(stamps.len())
    }

    /// Drop timestamps older than the window. Stamps are inserted in
    /// increasing order, so only a prefix can be stale.
    fn prune(stamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(front) = stamps.front() {
            if now.duration_since(*front) >= WINDOW {
                stamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_limit() {
        let quota = RequestQuota::new(10);
        let t0 = Instant::now();

        for _ in 0..10 {
            assert!(quota.try_acquire_at(t0));
        }
        // The 11th call in the same window is denied
        assert!(!quota.try_acquire_at(t0));
    }

    #[test]
    fn test_denies_mid_window() {
        let quota = RequestQuota::new(10);
        let t0 = Instant::now();

        for _ in 0..10 {
            assert!(quota.try_acquire_at(t0));
        }
        // 10 calls at t=0 deny an 11th at t=30s
        assert!(!quota.try_acquire_at(t0 + Duration::from_secs(30)));
    }

    #[test]
    fn test_capacity_frees_after_window() {
        let quota = RequestQuota::new(10);
        let t0 = Instant::now();

        for _ in 0..10 {
            assert!(quota.try_acquire_at(t0));
        }
        // At t=61s the earliest stamps have aged out
        assert!(quota.try_acquire_at(t0 + Duration::from_secs(61)));
    }

    #[test]
    fn test_window_slides_over_staggered_calls() {
        let quota = RequestQuota::new(2);
        let t0 = Instant::now();

        assert!(quota.try_acquire_at(t0));
        assert!(quota.try_acquire_at(t0 + Duration::from_secs(30)));
        assert!(!quota.try_acquire_at(t0 + Duration::from_secs(45)));
        // t0's stamp expires at t0+60s; the t0+30s stamp remains
        assert!(quota.try_acquire_at(t0 + Duration::from_secs(60)));
        assert!(!quota.try_acquire_at(t0 + Duration::from_secs(61)));
    }

    #[test]
    fn test_remaining() {
        let quota = RequestQuota::new(3);
        let t0 = Instant::now();

        assert_eq!(quota.remaining_at(t0), 3);
        quota.try_acquire_at(t0);
        quota.try_acquire_at(t0);
        assert_eq!(quota.remaining_at(t0), 1);
        assert_eq!(quota.remaining_at(t0 + Duration::from_secs(61)), 3);
    }
}
