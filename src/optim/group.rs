//! Parameter groups and optimizer configuration.

use serde::{Deserialize, Serialize};

use super::error::{OptimError, Result};
use super::param::Parameter;

/// Optimizer defaults shared across parameter groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Learning rate
    pub lr: f32,
    /// Exponential decay rates for the first and second moment estimates
    pub betas: (f32, f32),
    /// Denominator term for numerical stability
    pub eps: f32,
    /// Decoupled weight decay coefficient
    pub weight_decay: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            betas: (0.9, 0.999),
            eps: 1e-8,
            weight_decay: 0.0,
        }
    }
}

/// Per-group settings prior to validation.
///
/// `lr_scale` carries no default: every group must state its scale
/// explicitly before it can be turned into a [`ParamGroup`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Learning rate
    pub lr: f32,
    /// Per-group learning-rate scale; required
    pub lr_scale: Option<f32>,
    /// Moment decay rates
    pub betas: (f32, f32),
    /// Denominator term for numerical stability
    pub eps: f32,
    /// Decoupled weight decay coefficient
    pub weight_decay: f32,
    /// Track the elementwise maximum of the second moment
    pub amsgrad: bool,
}

impl GroupOptions {
    /// Seed group options from shared optimizer defaults
    #[must_use]
    pub fn from_config(config: &AdamConfig) -> Self {
        Self {
            lr: config.lr,
            lr_scale: None,
            betas: config.betas,
            eps: config.eps,
            weight_decay: config.weight_decay,
            amsgrad: false,
        }
    }

    /// Set the learning rate
    #[must_use]
    pub fn lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    /// Set the learning-rate scale
    #[must_use]
    pub fn lr_scale(mut self, scale: f32) -> Self {
        self.lr_scale = Some(scale);
        self
    }

    /// Set the moment decay rates
    #[must_use]
    pub fn betas(mut self, betas: (f32, f32)) -> Self {
        self.betas = betas;
        self
    }

    /// Set the stability term
    #[must_use]
    pub fn eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Set the weight decay coefficient
    #[must_use]
    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Enable or disable AMSGrad max-tracking
    #[must_use]
    pub fn amsgrad(mut self, amsgrad: bool) -> Self {
        self.amsgrad = amsgrad;
        self
    }
}

/// A group of parameters sharing optimizer settings.
///
/// Groups are owned by the caller; the scheduler adjusts `lr` and `lr_scale`
/// between steps.
#[derive(Debug, Clone)]
pub struct ParamGroup {
    /// Parameters updated with this group's settings
    pub params: Vec<Parameter>,
    /// Learning rate
    pub lr: f32,
    /// Per-group learning-rate scale honored by updates and reports
    pub lr_scale: f32,
    /// Moment decay rates
    pub betas: (f32, f32),
    /// Denominator term for numerical stability
    pub eps: f32,
    /// Decoupled weight decay coefficient
    pub weight_decay: f32,
    /// Track the elementwise maximum of the second moment
    pub amsgrad: bool,
}

impl ParamGroup {
    /// Validate group options into a group.
    ///
    /// A group without an explicit `lr_scale` is a configuration error.
    pub fn new(params: Vec<Parameter>, options: GroupOptions) -> Result<Self> {
        let lr_scale = options.lr_scale.ok_or(OptimError::MissingLrScale)?;
        Ok(Self {
            params,
            lr: options.lr,
            lr_scale,
            betas: options.betas,
            eps: options.eps,
            weight_decay: options.weight_decay,
            amsgrad: options.amsgrad,
        })
    }

    /// Effective learning rate after scaling
    #[must_use]
    pub fn effective_lr(&self) -> f32 {
        self.lr * self.lr_scale
    }
}

/// Distinct effective learning rates across groups, comma-joined.
///
/// First-seen order, deduplicated on exact value. Used only for reporting.
#[must_use]
pub fn lr_report(groups: &[ParamGroup]) -> String {
    let mut distinct: Vec<f32> = Vec::new();
    for group in groups {
        let lr = group.effective_lr();
        if !distinct.iter().any(|&seen| seen == lr) {
            distinct.push(lr);
        }
    }
    distinct
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
