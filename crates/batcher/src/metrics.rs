//! Queue counters.

/// Running counters kept by a [`TxQueue`](crate::TxQueue).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueMetrics {
    // Intake
    /// Pending calls accepted by the queue.
    pub calls_enqueued: u64,
    /// Pending calls whose caller has been answered.
    pub calls_settled: u64,

    // Submissions
    /// Transactions handed to the dispatcher.
    pub submissions: u64,
    /// Submissions that carried more than one pending call.
    pub merged_submissions: u64,
    /// Submissions that ended in an error.
    pub failed_submissions: u64,

    // Processing
    /// Processing passes run.
    pub passes: u64,
}

impl QueueMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one accepted call.
    pub const fn record_enqueue(&mut self) {
        self.calls_enqueued += 1;
    }

    /// Record one submission covering `members` pending calls.
    pub const fn record_submission(&mut self, members: usize, failed: bool) {
        self.submissions += 1;
        self.calls_settled += members as u64;
        if members > 1 {
            self.merged_submissions += 1;
        }
        if failed {
            self.failed_submissions += 1;
        }
    }

    /// Record the start of a processing pass.
    pub const fn record_pass(&mut self) {
        self.passes += 1;
    }

    /// Pending calls accepted but not yet answered.
    pub const fn in_flight(&self) -> u64 {
        self.calls_enqueued.saturating_sub(self.calls_settled)
    }

    /// Average number of pending calls per submission.
    pub fn merge_ratio(&self) -> f64 {
        if self.submissions == 0 {
            return 1.0;
        }
        self.calls_settled as f64 / self.submissions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_default_metrics() {
        let metrics = QueueMetrics::new();
        assert_eq!(metrics, QueueMetrics::default());
        assert_eq!(metrics.merge_ratio(), 1.0);
    }

    #[test]
    fn test_record_submission_counts_members() {
        let mut metrics = QueueMetrics::new();
        for _ in 0..3 {
            metrics.record_enqueue();
        }
        metrics.record_submission(2, false);
        assert_eq!(metrics.in_flight(), 1);

        metrics.record_submission(1, true);
        assert_eq!(metrics.submissions, 2);
        assert_eq!(metrics.merged_submissions, 1);
        assert_eq!(metrics.failed_submissions, 1);
        assert_eq!(metrics.in_flight(), 0);
        assert_eq!(metrics.merge_ratio(), 1.5);
    }
}
