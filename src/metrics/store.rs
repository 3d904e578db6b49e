use super::Sample;
use crate::error::InvalidSample;

/// Append-only history of samples, insertion order preserved.
///
/// Owned by the session controller; nothing else mutates it.
#[derive(Debug, Default, Clone)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample to the end of the history.
    ///
    /// Rejects samples that break the cache-hit/variant pairing, carry a
    /// negative or non-finite latency, or are timestamped before the last
    /// stored sample.
    pub fn append(&mut self, sample: Sample) -> Result<(), InvalidSample> {
        sample.validate()?;
        if let Some(last) = self.samples.last() {
            if sample.captured_at < last.captured_at {
                return Err(InvalidSample::OutOfOrder {
                    last: last.captured_at,
                    got: sample.captured_at,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Empty the history. Idempotent.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// The last `n` samples, most recent first.
    pub fn recent(&self, n: usize) -> impl ExactSizeIterator<Item = &Sample> + Clone + '_ {
        self.samples.iter().rev().take(n)
    }

    /// Full history in insertion order.
    pub fn all(&self) -> impl ExactSizeIterator<Item = &Sample> + Clone + '_ {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
