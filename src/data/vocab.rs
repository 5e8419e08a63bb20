//! Vocabulary contract for special token ids.

/// Token ID type
pub type TokenId = u32;

/// Special-token contract consumed from an external tokenizer/vocabulary.
///
/// Only the three ids the collator needs; tokenization itself happens
/// elsewhere. The `sep` id doubles as the target boundary marker, there is
/// no distinct end-of-sequence id.
pub trait Vocabulary {
    /// Padding token id
    fn pad_id(&self) -> TokenId;

    /// Row-start marker id
    fn cls_id(&self) -> TokenId;

    /// Segment-boundary marker id
    fn sep_id(&self) -> TokenId;
}
