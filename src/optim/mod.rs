//! Decoupled-weight-decay optimization over parameter groups.

mod clip;
mod error;
mod fix_adam;
mod group;
mod param;

pub use clip::{clip_grad_norm, multiply_grads, zero_grad};
pub use error::{OptimError, Result};
pub use fix_adam::FixedAdam;
pub use group::{lr_report, AdamConfig, GroupOptions, ParamGroup};
pub use param::{Gradient, Parameter};
