//! Adam with decoupled ("fixed") weight decay.
//!
//! Weight decay is applied directly to the parameter values instead of being
//! folded into the gradient, so the adaptive denominator never distorts the
//! decay magnitude. Optionally tracks the elementwise maximum of the second
//! moment (AMSGrad) for the denominator.

use ndarray::{Array1, Zip};

use super::error::{OptimError, Result};
use super::group::ParamGroup;
use super::param::Gradient;

/// Per-parameter moment state, created lazily on the first update
#[derive(Debug, Clone)]
struct AdamState {
    step: u64,
    exp_avg: Array1<f32>,
    exp_avg_sq: Array1<f32>,
    max_exp_avg_sq: Option<Array1<f32>>,
}

impl AdamState {
    fn new(len: usize, amsgrad: bool) -> Self {
        Self {
            step: 0,
            exp_avg: Array1::zeros(len),
            exp_avg_sq: Array1::zeros(len),
            max_exp_avg_sq: amsgrad.then(|| Array1::zeros(len)),
        }
    }
}

/// Decoupled-weight-decay Adam over caller-owned parameter groups.
///
/// Moment state is keyed positionally by (group index, parameter index), so
/// group and parameter order must stay stable across steps.
#[derive(Debug, Default)]
pub struct FixedAdam {
    state: Vec<Vec<Option<AdamState>>>,
}

impl FixedAdam {
    /// Create an optimizer with no accumulated state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update to every parameter that has a gradient.
    ///
    /// Parameters are updated independently: an error on one parameter leaves
    /// every other parameter's state consistent and the failing parameter not
    /// advanced.
    pub fn step(&mut self, groups: &mut [ParamGroup]) -> Result<()> {
        if self.state.len() < groups.len() {
            self.state.resize_with(groups.len(), Vec::new);
        }

        for (group_idx, group) in groups.iter_mut().enumerate() {
            let (beta1, beta2) = group.betas;
            let lr = group.lr;
            let lr_scale = group.lr_scale;
            let eps = group.eps;
            let weight_decay = group.weight_decay;
            let amsgrad = group.amsgrad;

            let states = &mut self.state[group_idx];
            if states.len() < group.params.len() {
                states.resize_with(group.params.len(), || None);
            }

            for (param_idx, param) in group.params.iter_mut().enumerate() {
                let grad = match &param.grad {
                    None => continue,
                    Some(Gradient::Sparse { .. }) => {
                        return Err(OptimError::UnsupportedGradient {
                            group: group_idx,
                            index: param_idx,
                        });
                    }
                    Some(Gradient::Dense(grad)) => grad,
                };

                let state = states[param_idx]
                    .get_or_insert_with(|| AdamState::new(param.data.len(), amsgrad));

                state.step += 1;
                state
                    .exp_avg
                    .zip_mut_with(grad, |m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
                state
                    .exp_avg_sq
                    .zip_mut_with(grad, |v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);
                if let Some(max_sq) = &mut state.max_exp_avg_sq {
                    max_sq.zip_mut_with(&state.exp_avg_sq, |mx, &v| *mx = mx.max(v));
                }

                let bias_correction1 = 1.0 - beta1.powi(state.step as i32);
                let bias_correction2 = 1.0 - beta2.powi(state.step as i32);
                let step_size = lr * lr_scale * bias_correction2.sqrt() / bias_correction1;

                if weight_decay != 0.0 {
                    let decay = weight_decay * lr * lr_scale;
                    param.data.mapv_inplace(|p| p - decay * p);
                }

                let denom_src = match &state.max_exp_avg_sq {
                    Some(max_sq) => max_sq,
                    None => &state.exp_avg_sq,
                };
                Zip::from(&mut param.data)
                    .and(&state.exp_avg)
                    .and(denom_src)
                    .for_each(|p, &m, &v| *p -= step_size * m / (v.sqrt() + eps));
            }
        }

        Ok(())
    }

    /// Reevaluate the loss through the supplied closure, then step.
    ///
    /// The closure's return value is the reported loss.
    pub fn step_with_closure<F>(&mut self, groups: &mut [ParamGroup], closure: F) -> Result<f32>
    where
        F: FnOnce() -> f32,
    {
        let loss = closure();
        self.step(groups)?;
        Ok(loss)
    }
}
