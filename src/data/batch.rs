//! Batch structs for model consumption

use ndarray::Array2;

use super::vocab::TokenId;

/// Model-facing input tensors
#[derive(Debug, Clone)]
pub struct NetInput {
    /// Packed source token IDs [batch_size, src_width]
    pub input_ids: Array2<TokenId>,
    /// Segment type IDs [batch_size, src_width]
    pub token_type_ids: Array2<TokenId>,
    /// Attention mask [batch_size, src_width] (1 = attend, 0 = ignore)
    pub attention_mask: Array2<u8>,
    /// Shifted-right target for teacher forcing [batch_size, tgt_width]
    pub prev_output_tokens: Array2<TokenId>,
}

/// A collated batch, row order matching the input example order
#[derive(Debug, Clone)]
pub struct Batch {
    /// Example IDs in original input order
    pub ids: Vec<usize>,
    /// Number of examples
    pub sample_count: usize,
    /// Total target tokens: truncated target length + 1 per example
    pub token_count: usize,
    /// Inputs consumed by the model
    pub net_input: NetInput,
    /// Training labels [batch_size, tgt_width]
    pub target: Array2<TokenId>,
}

impl Batch {
    /// Get batch size
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.net_input.input_ids.nrows()
    }

    /// Source row width
    #[must_use]
    pub fn source_width(&self) -> usize {
        self.net_input.input_ids.ncols()
    }

    /// Target row width
    #[must_use]
    pub fn target_width(&self) -> usize {
        self.target.ncols()
    }
}
