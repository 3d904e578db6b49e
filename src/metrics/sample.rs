use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidSample;

/// Which code path produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Served through the cache (may still fall through to the origin).
    Cached,
    /// Always goes straight to the origin.
    Uncached,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Cached, Variant::Uncached];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Cached => "cached",
            Variant::Uncached => "uncached",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed outcome of a single test invocation.
/// The sample source builds these; the session pushes them into the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub variant: Variant,
    /// Measured round-trip time in milliseconds
    pub latency_ms: f64,
    /// Only present for `Variant::Cached`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    /// Payload length, display only
    pub item_count: u64,
    pub captured_at: DateTime<Utc>,
}

impl Sample {
    /// A cached-path outcome stamped with the current time.
    pub fn cached(latency_ms: f64, hit: bool, item_count: u64) -> Self {
        Self {
            variant: Variant::Cached,
            latency_ms,
            cache_hit: Some(hit),
            item_count,
            captured_at: Utc::now(),
        }
    }

    /// An origin-only outcome stamped with the current time.
    pub fn uncached(latency_ms: f64, item_count: u64) -> Self {
        Self {
            variant: Variant::Uncached,
            latency_ms,
            cache_hit: None,
            item_count,
            captured_at: Utc::now(),
        }
    }

    pub fn at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Checks the invariants that do not depend on store contents.
    pub fn validate(&self) -> Result<(), InvalidSample> {
        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            return Err(InvalidSample::InvalidLatency(self.latency_ms));
        }
        match (self.variant, self.cache_hit) {
            (Variant::Cached, Some(_)) | (Variant::Uncached, None) => Ok(()),
            (variant, _) => Err(InvalidSample::CacheHitMismatch { variant }),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.cache_hit == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_respect_cache_hit_invariant() {
        assert!(Sample::cached(12.0, true, 8).validate().is_ok());
        assert!(Sample::uncached(240.0, 8).validate().is_ok());
    }

    #[test]
    fn uncached_with_cache_hit_is_rejected() {
        let mut s = Sample::uncached(10.0, 1);
        s.cache_hit = Some(false);
        assert!(matches!(
            s.validate(),
            Err(InvalidSample::CacheHitMismatch { variant: Variant::Uncached })
        ));
    }

    #[test]
    fn cached_without_cache_hit_is_rejected() {
        let mut s = Sample::cached(10.0, true, 1);
        s.cache_hit = None;
        assert!(s.validate().is_err());
    }

    #[test]
    fn negative_or_nan_latency_is_rejected() {
        assert!(Sample::uncached(-1.0, 0).validate().is_err());
        assert!(Sample::uncached(f64::NAN, 0).validate().is_err());
        assert!(Sample::uncached(0.0, 0).validate().is_ok());
    }

    #[test]
    fn uncached_sample_omits_cache_hit_in_json() {
        let json = serde_json::to_value(Sample::uncached(5.0, 3)).unwrap();
        assert!(json.get("cacheHit").is_none());
        assert_eq!(json["variant"], "uncached");
        assert_eq!(json["itemCount"], 3);
    }
}
