use hdrhistogram::Histogram;
use serde::Serialize;

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

/// Quantiles reported per variant, in field order.
const QUANTILES: [f64; 4] = [0.50, 0.95, 0.99, 0.999];

/// Latency histogram in microseconds for one variant.
pub(crate) fn latency_histogram() -> Histogram<u64> {
    Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
        .expect("histogram creation")
}

/// Milliseconds → whole microseconds, clamped to the histogram range.
pub(crate) fn record_latency(hist: &mut Histogram<u64>, latency_ms: f64) {
    let us = (latency_ms * 1000.0).round() as u64;
    hist.saturating_record(us.clamp(HIST_LOW, HIST_HIGH));
}

/// Latency distribution of one variant (μs). All zero until something is
/// recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSet {
    pub count: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub p999_us: u64,
}

impl From<&Histogram<u64>> for PercentileSet {
    fn from(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }
        let [p50_us, p95_us, p99_us, p999_us] = QUANTILES.map(|q| hist.value_at_quantile(q));
        Self {
            count: hist.len(),
            min_us: hist.min(),
            max_us: hist.max(),
            mean_us: hist.mean(),
            p50_us,
            p95_us,
            p99_us,
            p999_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_gives_zeroes() {
        let set = PercentileSet::from(&latency_histogram());
        assert_eq!(set, PercentileSet::default());
        assert_eq!(set.count, 0);
    }

    #[test]
    fn sub_microsecond_latency_is_clamped() {
        let mut hist = latency_histogram();
        record_latency(&mut hist, 0.0);
        let set = PercentileSet::from(&hist);
        assert_eq!(set.count, 1);
        assert_eq!(set.min_us, 1);
    }

    #[test]
    fn percentiles_track_recorded_values() {
        let mut hist = latency_histogram();
        for ms in 1..=100 {
            record_latency(&mut hist, ms as f64);
        }
        let set = PercentileSet::from(&hist);
        assert_eq!(set.count, 100);
        // 3 significant figures
        assert!((set.p50_us as f64 - 50_000.0).abs() <= 50.0);
        assert!(set.p99_us >= set.p95_us);
        assert!(set.max_us >= 99_900);
    }
}
