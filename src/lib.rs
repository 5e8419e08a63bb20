//! Multi-segment sequence batching and decoupled weight decay optimization
//! for sequence-to-sequence training.
//!
//! Two independent components, no shared state:
//!
//! - [`data`]: packs three independently-sized source segments plus a target
//!   sequence into fixed-width tensors with segment markers, type ids, and
//!   attention masks, and orders examples by capped combined length for
//!   efficient batching.
//! - [`optim`]: Adam with decoupled weight decay over caller-owned parameter
//!   groups, with per-group learning-rate scaling and optional AMSGrad
//!   max-tracking.

pub mod data;
pub mod optim;

pub use data::{
    Batch, DataError, Example, IndexedSource, MultiSegmentCollator, MultiSegmentDataset, NetInput,
    TokenId, Vocabulary,
};
pub use optim::{
    clip_grad_norm, lr_report, multiply_grads, zero_grad, AdamConfig, FixedAdam, Gradient,
    GroupOptions, OptimError, ParamGroup, Parameter,
};
