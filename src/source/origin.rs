use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

// ─── Name pools ──────────────────────────────────────────────────

static KINDS: &[(&str, &str)] = &[
    ("Product", "Electronics"),
    ("Service", "Services"),
    ("Item", "General"),
];

static QUALITIES: &[&str] = &[
    "Basic",
    "Standard",
    "Premium",
    "Professional",
    "High-quality",
    "Top-tier",
    "Essential",
];

static SUFFIXES: &[&str] = &["A", "B", "X", "Y", "1", "2", "Plus", "Max"];

/// One row of the origin's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: u32,
    pub category: String,
}

/// A deliberately slow data source standing in for a database.
///
/// Every load sleeps for a random delay in `delay_ms` before returning the
/// full catalog.
#[derive(Debug, Clone)]
pub struct Origin {
    items: Vec<CatalogItem>,
    delay_ms: RangeInclusive<u64>,
}

impl Origin {
    pub fn new(items: Vec<CatalogItem>, delay_ms: RangeInclusive<u64>) -> Self {
        Self { items, delay_ms }
    }

    /// Build an origin with `size` generated rows. Same seed, same catalog.
    pub fn seeded(size: usize, seed: u64, delay_ms: RangeInclusive<u64>) -> Self {
        Self::new(seed_catalog(size, seed), delay_ms)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Simulated query: wait out the delay, then return every row.
    pub async fn load(&self) -> Vec<CatalogItem> {
        let delay = rand::thread_rng().gen_range(self.delay_ms.clone());
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.items.clone()
    }
}

/// Generate `size` catalog rows from the name pools.
pub fn seed_catalog(size: usize, seed: u64) -> Vec<CatalogItem> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=size as u64)
        .map(|id| {
            let (kind, category) = KINDS[rng.gen_range(0..KINDS.len())];
            let quality = QUALITIES[rng.gen_range(0..QUALITIES.len())];
            let suffix = SUFFIXES[rng.gen_range(0..SUFFIXES.len())];
            CatalogItem {
                id,
                name: format!("{kind} {suffix}"),
                description: format!("{quality} {} {suffix}", kind.to_lowercase()),
                price: rng.gen_range(5..=100u32) * 5,
                category: category.to_string(),
            }
        })
        .collect()
}
