//! Round-trip time statistics.

/// Summary statistics for a sequence of round-trip time samples.
///
/// The `min` and `max` retain their sentinel initial values (1.0 and 0.0
/// seconds respectively) when no sample was received; they are not a true
/// statistical floor and ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttSummary {
    /// The minimum round-trip time in seconds.
    pub min: f64,
    /// The maximum round-trip time in seconds.
    pub max: f64,
    /// The mean round-trip time in seconds, 0.0 when no sample was received.
    pub avg: f64,
    /// The fraction of probes which did not produce a sample, in 0.0..=1.0.
    pub loss: f64,
}

/// Summarize a sequence of optional round-trip time samples.
///
/// Absent samples represent lost probes: they contribute to `loss` and are
/// excluded from `min`, `max` and `avg`.  An empty sequence yields zero loss.
#[must_use]
pub fn summarize(samples: &[Option<f64>]) -> RttSummary {
    let mut min = 1.0_f64;
    let mut max = 0.0_f64;
    let mut total = 0.0_f64;
    let mut received = 0_usize;
    for rtt in samples.iter().flatten() {
        min = min.min(*rtt);
        max = max.max(*rtt);
        total += *rtt;
        received += 1;
    }
    let avg = if received > 0 {
        total / received as f64
    } else {
        0.0
    };
    let loss = if samples.is_empty() {
        0.0
    } else {
        (samples.len() - received) as f64 / samples.len() as f64
    };
    RttSummary {
        min,
        max,
        avg,
        loss,
    }
}

/// Accumulated state for a probing session.
///
/// Holds one entry per completed probe, `None` for probes which produced no
/// round-trip time sample.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    samples: Vec<Option<f64>>,
    error: Option<String>,
}

impl SessionState {
    pub(crate) fn record(&mut self, sample: Option<f64>) {
        self.samples.push(sample);
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// The per-probe round-trip time samples recorded so far.
    #[must_use]
    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// The error which ended the session, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Summarize the samples recorded so far.
    #[must_use]
    pub fn summary(&self) -> RttSummary {
        summarize(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_empty() {
        let summary = summarize(&[]);
        assert!((summary.loss - 0.0).abs() < EPSILON);
        assert!((summary.avg - 0.0).abs() < EPSILON);
        assert!((summary.min - 1.0).abs() < EPSILON);
        assert!((summary.max - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_mixed_samples() {
        let summary = summarize(&[Some(0.01), None, Some(0.03)]);
        assert!((summary.avg - 0.02).abs() < EPSILON);
        assert!((summary.min - 0.01).abs() < EPSILON);
        assert!((summary.max - 0.03).abs() < EPSILON);
        assert!((summary.loss - 1.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_all_received() {
        let summary = summarize(&[Some(0.1), Some(0.2)]);
        assert!((summary.loss - 0.0).abs() < EPSILON);
        assert!((summary.avg - 0.15).abs() < EPSILON);
    }

    #[test]
    fn test_all_lost_retains_sentinels() {
        let summary = summarize(&[None, None]);
        assert!((summary.loss - 1.0).abs() < EPSILON);
        assert!((summary.avg - 0.0).abs() < EPSILON);
        assert!((summary.min - 1.0).abs() < EPSILON);
        assert!((summary.max - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_sample_above_sentinel_min() {
        let summary = summarize(&[Some(2.5)]);
        assert!((summary.min - 1.0).abs() < EPSILON);
        assert!((summary.max - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_session_state() {
        let mut state = SessionState::default();
        state.record(Some(0.25));
        state.record(None);
        assert_eq!(&[Some(0.25), None], state.samples());
        let summary = state.summary();
        assert!((summary.loss - 0.5).abs() < EPSILON);
        assert!((summary.avg - 0.25).abs() < EPSILON);
        assert_eq!(None, state.error());
        state.set_error(Some(String::from("oops")));
        assert_eq!(Some("oops"), state.error());
    }
}
