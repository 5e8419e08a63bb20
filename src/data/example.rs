//! Multi-segment dataset example

use super::vocab::TokenId;

/// A single example: three source segments plus a target sequence
#[derive(Debug, Clone)]
pub struct Example {
    /// Example ID (original dataset index)
    pub id: usize,
    /// Segment A token IDs
    pub a: Vec<TokenId>,
    /// Segment B1 token IDs
    pub b1: Vec<TokenId>,
    /// Segment B2 token IDs
    pub b2: Vec<TokenId>,
    /// Target token IDs
    pub target: Vec<TokenId>,
}

impl Example {
    /// Create a new example
    #[must_use]
    pub fn new(
        id: usize,
        a: Vec<TokenId>,
        b1: Vec<TokenId>,
        b2: Vec<TokenId>,
        target: Vec<TokenId>,
    ) -> Self {
        Self { id, a, b1, b2, target }
    }

    /// Combined untruncated source length
    #[must_use]
    pub fn source_len(&self) -> usize {
        self.a.len() + self.b1.len() + self.b2.len()
    }
}
