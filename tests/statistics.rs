//! Invariants of the store and the statistics derived from it, checked over
//! randomly generated histories.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cache_latency_lab::metrics::{compute, Aggregator};
use cache_latency_lab::{InvalidSample, Sample, SampleStore, Statistics, Variant};

fn random_history(seed: u64, len: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc::now();
    (0..len)
        .map(|i| {
            let at = base + Duration::milliseconds(i as i64);
            if rng.gen_bool(0.5) {
                Sample::cached(rng.gen_range(0.0..120.0), rng.gen_bool(0.7), 8).at(at)
            } else {
                Sample::uncached(rng.gen_range(100.0..500.0), 8).at(at)
            }
        })
        .collect()
}

fn store_from(samples: &[Sample]) -> SampleStore {
    let mut store = SampleStore::new();
    for s in samples {
        store.append(s.clone()).unwrap();
    }
    store
}

fn naive_mean(samples: &[Sample], variant: Variant) -> f64 {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.variant == variant)
        .map(|s| s.latency_ms)
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().fold(0.0, |acc, v| acc + v) / values.len() as f64
}

#[test]
fn total_requests_equals_sample_count() {
    for seed in 0..20 {
        let len = seed as usize * 7;
        let samples = random_history(seed, len);
        let stats = compute(&store_from(&samples));
        assert_eq!(stats.total_requests, len as u64, "seed {seed}");
        assert_eq!(
            stats.cached.latency.count + stats.uncached.count,
            stats.total_requests
        );
    }
}

#[test]
fn averages_are_arithmetic_means() {
    for seed in 0..20 {
        let samples = random_history(seed, 50);
        let stats = compute(&store_from(&samples));
        for variant in Variant::ALL {
            assert_eq!(
                stats.variant(variant).avg_latency_ms,
                naive_mean(&samples, variant),
                "seed {seed}, {variant}"
            );
        }
    }
}

#[test]
fn hit_rate_is_percentage_of_cached_hits() {
    for seed in 0..20 {
        let samples = random_history(seed, 60);
        let stats = compute(&store_from(&samples));

        let cached: Vec<&Sample> = samples.iter().filter(|s| s.variant == Variant::Cached).collect();
        let hits = cached.iter().filter(|s| s.cache_hit == Some(true)).count();
        let expected = if cached.is_empty() {
            0.0
        } else {
            100.0 * hits as f64 / cached.len() as f64
        };

        assert_eq!(stats.cached.hits, hits as u64);
        assert!(
            (stats.cached.hit_rate - expected).abs() < 1e-9,
            "seed {seed}: {} vs {expected}",
            stats.cached.hit_rate
        );
    }
}

#[test]
fn empty_variants_are_exactly_zero() {
    let uncached_only: Vec<Sample> = random_history(3, 30)
        .into_iter()
        .filter(|s| s.variant == Variant::Uncached)
        .collect();
    let stats = compute(&store_from(&uncached_only));
    assert_eq!(stats.cached.latency.count, 0);
    assert_eq!(stats.cached.latency.avg_latency_ms, 0.0);
    assert_eq!(stats.cached.hit_rate, 0.0);
    assert_eq!(stats.cached.latency.percentiles.count, 0);
}

#[test]
fn clear_then_compute_is_all_zero() {
    for seed in 0..10 {
        let mut store = store_from(&random_history(seed, 25));
        store.clear();
        assert_eq!(compute(&store), Statistics::empty(), "seed {seed}");
    }
}

#[test]
fn incremental_aggregation_is_bit_identical() {
    for seed in 0..10 {
        let samples = random_history(seed, 80);
        let mut agg = Aggregator::new();
        for s in &samples {
            agg.push(s);
        }
        let full = compute(&store_from(&samples));
        let incremental = agg.snapshot();
        assert_eq!(incremental, full);
        for variant in Variant::ALL {
            assert_eq!(
                incremental.variant(variant).avg_latency_ms.to_bits(),
                full.variant(variant).avg_latency_ms.to_bits()
            );
        }
    }
}

#[test]
fn recent_never_exceeds_n_and_is_reversed() {
    let samples = random_history(11, 15);
    let store = store_from(&samples);
    for n in 0..20 {
        let recent: Vec<&Sample> = store.recent(n).collect();
        assert_eq!(recent.len(), n.min(samples.len()));
        let expected: Vec<&Sample> = samples.iter().rev().take(n).collect();
        assert_eq!(recent, expected);
    }
    assert_eq!(store.recent(0).count(), 0);
}

#[test]
fn uncached_with_cache_hit_is_invalid() {
    let mut store = SampleStore::new();
    let mut sample = Sample::uncached(120.0, 8);
    sample.cache_hit = Some(false);
    assert_eq!(
        store.append(sample),
        Err(InvalidSample::CacheHitMismatch {
            variant: Variant::Uncached
        })
    );
    assert!(store.is_empty());
}
