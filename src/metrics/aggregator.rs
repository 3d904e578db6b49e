use hdrhistogram::Histogram;
use serde::Serialize;

use super::percentiles::{latency_histogram, record_latency, PercentileSet};
use super::{Sample, SampleStore, Variant};

// ─── Public types ────────────────────────────────────────────────

/// Summary of one variant's samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStats {
    pub count: u64,
    /// Arithmetic mean, 0 when `count == 0`
    pub avg_latency_ms: f64,
    pub percentiles: PercentileSet,
}

/// Cached-variant summary: latency plus hit accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedStats {
    #[serde(flatten)]
    pub latency: VariantStats,
    pub hits: u64,
    /// Percentage of cached samples that found an entry, 0 when empty
    pub hit_rate: f64,
}

/// Immutable snapshot derived from the whole sample history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub cached: CachedStats,
    pub uncached: VariantStats,
    pub total_requests: u64,
    /// How much faster the cached path is on average, in percent of the
    /// uncached average. 0 unless both variants have samples.
    pub latency_reduction_pct: f64,
}

impl Statistics {
    /// The all-zero snapshot of an empty store.
    pub fn empty() -> Self {
        Aggregator::new().snapshot()
    }

    pub fn variant(&self, variant: Variant) -> &VariantStats {
        match variant {
            Variant::Cached => &self.cached.latency,
            Variant::Uncached => &self.uncached,
        }
    }
}

/// Full recomputation: a pure function of the store's contents.
pub fn compute(store: &SampleStore) -> Statistics {
    let mut agg = Aggregator::new();
    for sample in store.all() {
        agg.push(sample);
    }
    agg.snapshot()
}

// ─── Incremental aggregation ─────────────────────────────────────

/// Running sums per variant, updated one sample at a time.
///
/// `compute` replays the store through a fresh aggregator, so folding the
/// same samples in the same order always yields bit-identical snapshots.
#[derive(Clone)]
pub struct Aggregator {
    cached: Accumulator,
    uncached: Accumulator,
}

#[derive(Clone)]
struct Accumulator {
    count: u64,
    latency_sum: f64,
    hits: u64,
    hist: Histogram<u64>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            latency_sum: 0.0,
            hits: 0,
            hist: latency_histogram(),
        }
    }

    fn push(&mut self, sample: &Sample) {
        self.count += 1;
        self.latency_sum += sample.latency_ms;
        if sample.is_hit() {
            self.hits += 1;
        }
        record_latency(&mut self.hist, sample.latency_ms);
    }

    fn stats(&self) -> VariantStats {
        VariantStats {
            count: self.count,
            avg_latency_ms: ratio(self.latency_sum, self.count),
            percentiles: PercentileSet::from(&self.hist),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            cached: Accumulator::new(),
            uncached: Accumulator::new(),
        }
    }

    /// Fold one already-validated sample into the running totals.
    pub fn push(&mut self, sample: &Sample) {
        match sample.variant {
            Variant::Cached => self.cached.push(sample),
            Variant::Uncached => self.uncached.push(sample),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> Statistics {
        let cached = self.cached.stats();
        let uncached = self.uncached.stats();

        let latency_reduction_pct = if cached.count > 0
            && uncached.count > 0
            && uncached.avg_latency_ms > 0.0
        {
            (uncached.avg_latency_ms - cached.avg_latency_ms) / uncached.avg_latency_ms * 100.0
        } else {
            0.0
        };

        Statistics {
            total_requests: cached.count + uncached.count,
            cached: CachedStats {
                hits: self.cached.hits,
                hit_rate: ratio(self.cached.hits as f64, self.cached.count) * 100.0,
                latency: cached,
            },
            uncached,
            latency_reduction_pct,
        }
    }
}

/// `sum / count`, defined as 0 for an empty set.
fn ratio(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
