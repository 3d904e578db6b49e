pub mod aggregator;
pub mod percentiles;
pub mod sample;
pub mod store;

pub use aggregator::{compute, Aggregator, Statistics, VariantStats};
pub use percentiles::PercentileSet;
pub use sample::{Sample, Variant};
pub use store::SampleStore;
