//! Multi-segment batching for sequence-to-sequence training.
//!
//! Packs three independently-sized source segments (A, B1, B2) plus a target
//! sequence into fixed-width tensors with segment-boundary markers, type ids,
//! and attention masks, and provides length-bucketed ordering over aligned
//! indexed sources for efficient batching.

mod batch;
mod collator;
mod dataset;
mod error;
mod example;
mod vocab;


pub use batch::{Batch, NetInput};
pub use collator::MultiSegmentCollator;
pub use dataset::{IndexedSource, MultiSegmentDataset};
pub use error::{DataError, Result};
pub use example::Example;
pub use vocab::{TokenId, Vocabulary};
