//! Local accounting of a credential's daily quota.
//!
//! The tracker is advisory: the API remains the source of truth, and a request
//! the tracker allowed can still be rejected upstream.

/// Cost in quota units of one `videos.list` call.
///
/// Recorded once per logical page request. The HTTP client retries transient
/// failures internally, so one recorded unit may stand for up to
/// `1 + max_retries` requests against the real quota.
pub const VIDEOS_LIST_COST: u64 = 1;

/// Consumption against one credential's daily limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTracker {
    limit: u64,
    consumed: u64,
    requests_made: u64,
    /// Usage already recorded elsewhere before this tracker was created.
    seed: u64,
}

impl QuotaTracker {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self::seeded(limit, 0)
    }

    /// A tracker that starts with `consumed` units already spent today.
    #[must_use]
    pub fn seeded(limit: u64, consumed: u64) -> Self {
        Self {
            limit,
            consumed,
            requests_made: 0,
            seed: consumed,
        }
    }

    /// Whether spending `cost` more units stays within the limit.
    #[must_use]
    pub fn can_proceed(&self, cost: u64) -> bool {
        self.consumed.saturating_add(cost) <= self.limit
    }

    /// Records one request costing `cost` units.
    pub fn record(&mut self, cost: u64) {
        self.consumed = self.consumed.saturating_add(cost);
        self.requests_made = self.requests_made.saturating_add(1);
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Requests recorded by this tracker (not including the seed).
    #[must_use]
    pub fn requests_made(&self) -> u64 {
        self.requests_made
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed)
    }

    /// Units spent through this tracker since it was created.
    #[must_use]
    pub fn session_cost(&self) -> u64 {
        self.consumed.saturating_sub(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_proceed_up_to_limit_inclusive() {
        let mut t = QuotaTracker::new(3);
        assert!(t.can_proceed(3));
        assert!(!t.can_proceed(4));
        t.record(2);
        assert!(t.can_proceed(1));
        assert!(!t.can_proceed(2));
        t.record(1);
        assert!(!t.can_proceed(1));
        assert!(t.can_proceed(0));
    }

    #[test]
    fn record_adds_exactly_cost_and_counts_requests() {
        let mut t = QuotaTracker::new(100);
        t.record(1);
        t.record(5);
        assert_eq!(t.consumed(), 6);
        assert_eq!(t.requests_made(), 2);
        assert_eq!(t.remaining(), 94);
    }

    #[test]
    fn consumption_is_monotonic_and_saturates() {
        let mut t = QuotaTracker::seeded(10, u64::MAX - 1);
        let before = t.consumed();
        t.record(5);
        assert!(t.consumed() >= before);
        assert_eq!(t.consumed(), u64::MAX);
        assert_eq!(t.remaining(), 0);
        assert!(!t.can_proceed(1));
    }

    #[test]
    fn seeded_tracker_reports_only_session_cost() {
        let mut t = QuotaTracker::seeded(10_000, 9_990);
        assert_eq!(t.remaining(), 10);
        t.record(1);
        t.record(1);
        assert_eq!(t.session_cost(), 2);
        assert_eq!(t.consumed(), 9_992);
        assert_eq!(t.requests_made(), 2);
    }

    #[test]
    fn can_proceed_is_pure() {
        let t = QuotaTracker::new(1);
        for _ in 0..5 {
            assert!(t.can_proceed(1));
        }
        assert_eq!(t.consumed(), 0);
        assert_eq!(t.requests_made(), 0);
    }
}
