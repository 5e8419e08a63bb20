//! Length-bucketing facade over four aligned indexed sources

use rand::prelude::*;

use super::batch::Batch;
use super::collator::MultiSegmentCollator;
use super::error::{DataError, Result};
use super::example::Example;
use super::vocab::TokenId;

/// Indexed data source contract.
///
/// Prefetching is an optional performance hint, never required for
/// correctness.
pub trait IndexedSource {
    /// Number of sequences
    fn len(&self) -> usize;

    /// Check if the source is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence at `index`
    fn get(&self, index: usize) -> Option<Vec<TokenId>>;

    /// Whether bulk prefetching is supported
    fn supports_prefetch(&self) -> bool {
        false
    }

    /// Bulk prefetch hint
    fn prefetch(&mut self, _indices: &[usize]) {}
}

/// Aligned A/B1/B2/target sources with length-bucketed ordering.
///
/// Length arrays are precomputed by the caller so ordering never has to
/// materialize the sequences themselves.
pub struct MultiSegmentDataset {
    a: Box<dyn IndexedSource>,
    b1: Box<dyn IndexedSource>,
    b2: Box<dyn IndexedSource>,
    target: Box<dyn IndexedSource>,
    a_sizes: Vec<usize>,
    b1_sizes: Vec<usize>,
    b2_sizes: Vec<usize>,
    target_sizes: Vec<usize>,
    max_a_len: usize,
    max_b_len: usize,
    max_target_len: usize,
    shuffle: bool,
}

impl MultiSegmentDataset {
    /// Create a dataset over four aligned sources and their length arrays
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        a: Box<dyn IndexedSource>,
        a_sizes: Vec<usize>,
        b1: Box<dyn IndexedSource>,
        b1_sizes: Vec<usize>,
        b2: Box<dyn IndexedSource>,
        b2_sizes: Vec<usize>,
        target: Box<dyn IndexedSource>,
        target_sizes: Vec<usize>,
    ) -> Self {
        Self {
            a,
            b1,
            b2,
            target,
            a_sizes,
            b1_sizes,
            b2_sizes,
            target_sizes,
            max_a_len: 1024,
            max_b_len: 1024,
            max_target_len: 1024,
            shuffle: true,
        }
    }

    /// Set the segment A cap
    #[must_use]
    pub fn max_a_len(mut self, len: usize) -> Self {
        self.max_a_len = len;
        self
    }

    /// Set the B1/B2 segment cap
    #[must_use]
    pub fn max_b_len(mut self, len: usize) -> Self {
        self.max_b_len = len;
        self
    }

    /// Set the target cap
    #[must_use]
    pub fn max_target_len(mut self, len: usize) -> Self {
        self.max_target_len = len;
        self
    }

    /// Enable or disable shuffling in [`ordered_indices`](Self::ordered_indices)
    #[must_use]
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Number of examples
    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Check if the dataset is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assemble the example at `index` from the four sources.
    ///
    /// A source that cannot produce the index means the aligned sources
    /// disagree; that is a caller contract violation, not a retryable
    /// condition.
    pub fn get(&self, index: usize) -> Result<Example> {
        let a = self
            .a
            .get(index)
            .ok_or(DataError::MalformedExample { index, segment: "a" })?;
        let b1 = self
            .b1
            .get(index)
            .ok_or(DataError::MalformedExample { index, segment: "b1" })?;
        let b2 = self
            .b2
            .get(index)
            .ok_or(DataError::MalformedExample { index, segment: "b2" })?;
        let target = self
            .target
            .get(index)
            .ok_or(DataError::MalformedExample { index, segment: "target" })?;
        Ok(Example::new(index, a, b1, b2, target))
    }

    /// Capped combined token cost used for batching heuristics
    #[must_use]
    pub fn num_tokens(&self, index: usize) -> usize {
        let total = self.a_sizes[index]
            + self.b1_sizes[index]
            + self.b2_sizes[index]
            + self.target_sizes[index];
        total.min(self.max_a_len + 2 * self.max_b_len + self.max_target_len)
    }

    /// (combined source size, target size), used for max-position filtering
    #[must_use]
    pub fn size(&self, index: usize) -> (usize, usize) {
        (
            self.a_sizes[index] + self.b1_sizes[index] + self.b2_sizes[index],
            self.target_sizes[index],
        )
    }

    /// Batch-construction order.
    ///
    /// Starts from a seeded random permutation when shuffling is enabled,
    /// identity order otherwise, then sorts by capped combined length. The
    /// sort must be stable so equal-length ties keep their shuffled order.
    #[must_use]
    pub fn ordered_indices(&self, seed: u64) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(seed);
            indices.shuffle(&mut rng);
        }
        // sort_by_key is a stable sort
        indices.sort_by_key(|&i| self.num_tokens(i));
        indices
    }

    /// Forward a bulk prefetch hint to every underlying source
    pub fn prefetch(&mut self, indices: &[usize]) {
        self.a.prefetch(indices);
        self.b1.prefetch(indices);
        self.b2.prefetch(indices);
        self.target.prefetch(indices);
    }

    /// True only if all four sources support prefetching
    #[must_use]
    pub fn supports_prefetch(&self) -> bool {
        self.a.supports_prefetch()
            && self.b1.supports_prefetch()
            && self.b2.supports_prefetch()
            && self.target.supports_prefetch()
    }

    /// Synthesize a batch of filler examples with worst-case shapes.
    ///
    /// Lengths are clamped to the dataset caps and the batch holds
    /// `max(num_tokens / max(src_len, tgt_len), 1)` rows of deterministic
    /// filler tokens. Used to probe peak batch shapes before training.
    pub fn dummy_batch(
        &self,
        collator: &MultiSegmentCollator,
        num_tokens: usize,
        src_len: usize,
        tgt_len: usize,
    ) -> Result<Batch> {
        let src_len = src_len.min(self.max_a_len + 2 * self.max_b_len);
        let tgt_len = tgt_len.min(self.max_target_len);
        let batch_size = (num_tokens / src_len.max(tgt_len).max(1)).max(1);

        let examples: Vec<Example> = (0..batch_size)
            .map(|i| {
                let filler = |len: usize| -> Vec<TokenId> {
                    (0..len).map(|j| ((i + j) % 30000 + 2) as TokenId).collect()
                };
                Example::new(
                    i,
                    filler(src_len / 3),
                    filler(src_len / 3),
                    filler(src_len / 3),
                    filler(tgt_len),
                )
            })
            .collect();

        collator.collate(&examples)
    }
}
