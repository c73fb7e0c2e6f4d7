use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-worker interaction metrics, owned by the registry. Updated after
/// every worker invocation and every handoff; reset only by an explicit
/// administrative reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerMetrics {
    pub total_interactions: u64,
    pub successful_interactions: u64,
    pub error_count: u64,
    pub handoff_count: u64,
    pub average_response_time_ms: f64,
    /// Running mean over 0–100 confidence scores. Interactions that report
    /// no confidence do not move this average; `confidence_samples` is its
    /// denominator, deliberately separate from `total_interactions`.
    pub average_confidence: f64,
    pub confidence_samples: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl WorkerMetrics {
    pub fn record_interaction(
        &mut self,
        success: bool,
        response_time_ms: u64,
        confidence: Option<f64>,
    ) {
        let old_count = self.total_interactions;
        self.total_interactions += 1;
        if success {
            self.successful_interactions += 1;
        } else {
            self.error_count += 1;
        }

        self.average_response_time_ms = (self.average_response_time_ms * old_count as f64
            + response_time_ms as f64)
            / self.total_interactions as f64;

        if let Some(confidence) = confidence {
            let old_samples = self.confidence_samples;
            self.confidence_samples += 1;
            self.average_confidence = (self.average_confidence * old_samples as f64 + confidence)
                / self.confidence_samples as f64;
        }

        self.last_used = Some(Utc::now());
    }

    pub fn record_handoff(&mut self) {
        self.handoff_count += 1;
    }

    /// `(total - errors) / total * 100`; 100 when there are no samples.
    pub fn success_rate(&self) -> f64 {
        if self.total_interactions == 0 {
            100.0
        } else {
            (self.total_interactions - self.error_count) as f64
                / self.total_interactions as f64
                * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_matches_formula() {
        let mut m = WorkerMetrics::default();
        assert_eq!(m.success_rate(), 100.0);

        for _ in 0..8 {
            m.record_interaction(true, 100, None);
        }
        for _ in 0..2 {
            m.record_interaction(false, 100, None);
        }

        assert_eq!(m.total_interactions, 10);
        assert_eq!(m.error_count, 2);
        assert_eq!(m.success_rate(), 80.0);
    }

    #[test]
    fn response_time_is_a_running_mean() {
        let mut m = WorkerMetrics::default();
        m.record_interaction(true, 100, None);
        m.record_interaction(true, 300, None);
        assert_eq!(m.average_response_time_ms, 200.0);

        m.record_interaction(false, 200, None);
        assert_eq!(m.average_response_time_ms, 200.0);
    }

    #[test]
    fn missing_confidence_does_not_skew_the_average() {
        let mut m = WorkerMetrics::default();
        m.record_interaction(true, 100, Some(80.0));
        m.record_interaction(true, 100, None);
        m.record_interaction(true, 100, Some(60.0));

        assert_eq!(m.confidence_samples, 2);
        assert_eq!(m.average_confidence, 70.0);
        assert_eq!(m.total_interactions, 3);
    }

    #[test]
    fn handoffs_count_separately_from_interactions() {
        let mut m = WorkerMetrics::default();
        m.record_handoff();
        m.record_handoff();
        assert_eq!(m.handoff_count, 2);
        assert_eq!(m.total_interactions, 0);
    }
}
