//! Collator packing three source segments plus a target into fixed tensors

use ndarray::Array2;

use super::batch::{Batch, NetInput};
use super::error::{DataError, Result};
use super::example::Example;
use super::vocab::{TokenId, Vocabulary};

/// Collator for multi-segment examples with per-segment truncation.
///
/// Each source row is laid out as `cls, A, sep, B1, sep, B2, sep` with type
/// ids 0/1/2 over the A/B1/B2 ranges. Targets become a shifted pair: the
/// teacher-forcing input carries the `sep` boundary marker first, the label
/// sequence carries it last.
#[derive(Debug, Clone)]
pub struct MultiSegmentCollator {
    /// Padding token ID
    pub pad_id: TokenId,
    /// Row-start marker ID
    pub cls_id: TokenId,
    /// Segment-boundary marker ID, reused as the target boundary marker
    pub sep_id: TokenId,
    /// Hard cap on segment A length
    pub max_a_len: usize,
    /// Hard cap on each of the B1 and B2 segment lengths
    pub max_b_len: usize,
    /// Hard cap on target length
    pub max_target_len: usize,
}

impl Default for MultiSegmentCollator {
    fn default() -> Self {
        Self {
            pad_id: 0,
            cls_id: 101,
            sep_id: 102,
            max_a_len: 512,
            max_b_len: 512,
            max_target_len: 512,
        }
    }
}

impl MultiSegmentCollator {
    /// Create a collator with the given special token ids
    #[must_use]
    pub fn new(pad_id: TokenId, cls_id: TokenId, sep_id: TokenId) -> Self {
        Self {
            pad_id,
            cls_id,
            sep_id,
            ..Default::default()
        }
    }

    /// Create a collator taking its special token ids from a vocabulary
    #[must_use]
    pub fn from_vocab(vocab: &dyn Vocabulary) -> Self {
        Self::new(vocab.pad_id(), vocab.cls_id(), vocab.sep_id())
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

    /// Collate examples into a batch.
    ///
    /// Segments are truncated to their caps; truncation is policy, never an
    /// error. Row order matches the input order, any length-based reordering
    /// happens upstream.
    pub fn collate(&self, examples: &[Example]) -> Result<Batch> {
        if examples.is_empty() {
            return Err(DataError::EmptyBatch);
        }
        let batch_size = examples.len();

        // One global width for the whole batch, taken from the longest
        // combined untruncated example, clamped to the truncated worst case,
        // plus 4 slots for cls and the three sep markers.
        let longest = examples.iter().map(Example::source_len).max().unwrap_or(0);
        let src_width = longest.min(self.max_a_len + 2 * self.max_b_len) + 4;

        let mut input_ids = Array2::from_elem((batch_size, src_width), self.pad_id);
        let mut token_type_ids = Array2::from_elem((batch_size, src_width), self.pad_id);
        let mut attention_mask = Array2::<u8>::zeros((batch_size, src_width));

        for (i, example) in examples.iter().enumerate() {
            let size_a = example.a.len().min(self.max_a_len);
            let size_b1 = example.b1.len().min(self.max_b_len);
            let size_b2 = example.b2.len().min(self.max_b_len);

            input_ids[[i, 0]] = self.cls_id;
            for (j, &token) in example.a.iter().take(size_a).enumerate() {
                input_ids[[i, 1 + j]] = token;
            }
            input_ids[[i, size_a + 1]] = self.sep_id;
            for j in 0..size_a + 2 {
                token_type_ids[[i, j]] = 0;
            }

            for (j, &token) in example.b1.iter().take(size_b1).enumerate() {
                input_ids[[i, size_a + 2 + j]] = token;
            }
            input_ids[[i, size_a + 2 + size_b1]] = self.sep_id;
            for j in size_a + 2..size_a + 3 + size_b1 {
                token_type_ids[[i, j]] = 1;
            }

            for (j, &token) in example.b2.iter().take(size_b2).enumerate() {
                input_ids[[i, size_a + 3 + size_b1 + j]] = token;
            }
            input_ids[[i, size_a + 3 + size_b1 + size_b2]] = self.sep_id;
            for j in size_a + 3 + size_b1..size_a + 4 + size_b1 + size_b2 {
                token_type_ids[[i, j]] = 2;
            }

            for j in 0..size_a + 4 + size_b1 + size_b2 {
                attention_mask[[i, j]] = 1;
            }
        }

        let prev_output_tokens = self.merge_target(examples, true);
        let target = self.merge_target(examples, false);
        let token_count = examples
            .iter()
            .map(|e| e.target.len().min(self.max_target_len) + 1)
            .sum();

        Ok(Batch {
            ids: examples.iter().map(|e| e.id).collect(),
            sample_count: batch_size,
            token_count,
            net_input: NetInput {
                input_ids,
                token_type_ids,
                attention_mask,
                prev_output_tokens,
            },
            target,
        })
    }

    /// Pad truncated targets to a common width with a sep boundary marker,
    /// prepended for the teacher-forcing input or appended for the labels.
    fn merge_target(&self, examples: &[Example], marker_at_start: bool) -> Array2<TokenId> {
        let width = examples
            .iter()
            .map(|e| e.target.len().min(self.max_target_len) + 1)
            .max()
            .unwrap_or(1);
        let mut merged = Array2::from_elem((examples.len(), width), self.pad_id);

        for (i, example) in examples.iter().enumerate() {
            let len = example.target.len().min(self.max_target_len);
            if marker_at_start {
                merged[[i, 0]] = self.sep_id;
                for (j, &token) in example.target.iter().take(len).enumerate() {
                    merged[[i, 1 + j]] = token;
                }
            } else {
                for (j, &token) in example.target.iter().take(len).enumerate() {
                    merged[[i, j]] = token;
                }
                merged[[i, len]] = self.sep_id;
            }
        }

        merged
    }
}
