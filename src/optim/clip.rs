//! Gradient-wide operations across parameter groups.

use super::group::ParamGroup;
use super::param::Gradient;

/// Multiply every gradient by a constant, in place.
///
/// Used by callers for loss normalization before stepping.
pub fn multiply_grads(groups: &mut [ParamGroup], c: f32) {
    for group in groups {
        for param in &mut group.params {
            match &mut param.grad {
                Some(Gradient::Dense(grad)) => *grad *= c,
                Some(Gradient::Sparse { values, .. }) => {
                    for value in values {
                        *value *= c;
                    }
                }
                None => {}
            }
        }
    }
}

/// Clip gradients by global norm.
///
/// Computes the global L2 norm across every gradient. When `max_norm` is
/// positive and the norm exceeds it, all gradients are rescaled in place so
/// the global norm no longer exceeds `max_norm`; relative magnitudes across
/// parameters are preserved. A non-positive `max_norm` leaves gradients
/// untouched. Returns the pre-clip norm.
pub fn clip_grad_norm(groups: &mut [ParamGroup], max_norm: f32) -> f32 {
    let mut total_norm_sq = 0.0f32;
    for group in groups.iter() {
        for param in &group.params {
            match &param.grad {
                Some(Gradient::Dense(grad)) => {
                    total_norm_sq += grad.iter().map(|&g| g * g).sum::<f32>();
                }
                Some(Gradient::Sparse { values, .. }) => {
                    total_norm_sq += values.iter().map(|&g| g * g).sum::<f32>();
                }
                None => {}
            }
        }
    }
    let global_norm = total_norm_sq.sqrt();

    if max_norm > 0.0 && global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        multiply_grads(groups, clip_coef);
    }

    global_norm
}

/// Drop every gradient across all groups.
pub fn zero_grad(groups: &mut [ParamGroup]) {
    for group in groups {
        for param in &mut group.params {
            param.zero_grad();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::{AdamConfig, GroupOptions, Parameter};
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    fn group_of(params: Vec<Parameter>) -> ParamGroup {
        let options = GroupOptions::from_config(&AdamConfig::default()).lr_scale(1.0);
        ParamGroup::new(params, options).unwrap()
    }

    #[test]
    fn test_clip_grad_norm_no_clipping() {
        let mut p0 = Parameter::from_vec(vec![1.0, 2.0]);
        let mut p1 = Parameter::from_vec(vec![3.0]);
        p0.set_grad(arr1(&[0.1, 0.2]));
        p1.set_grad(arr1(&[0.1]));
        let mut groups = vec![group_of(vec![p0, p1])];

        // global norm = sqrt(0.1^2 + 0.2^2 + 0.1^2) ~ 0.245
        let global_norm = clip_grad_norm(&mut groups, 1.0);
        assert_abs_diff_eq!(global_norm, 0.245, epsilon = 1e-3);

        let grad = groups[0].params[0].dense_grad().unwrap();
        assert_abs_diff_eq!(grad[0], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[1], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_with_clipping() {
        let mut p0 = Parameter::from_vec(vec![1.0, 2.0]);
        let mut p1 = Parameter::from_vec(vec![3.0]);
        p0.set_grad(arr1(&[3.0, 4.0]));
        p1.set_grad(arr1(&[0.0]));
        let mut groups = vec![group_of(vec![p0, p1])];

        // global norm = sqrt(3^2 + 4^2) = 5.0, clip_coef = 0.2
        let global_norm = clip_grad_norm(&mut groups, 1.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);

        let grad = groups[0].params[0].dense_grad().unwrap();
        assert_abs_diff_eq!(grad[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_preserves_relative_magnitudes() {
        let mut p0 = Parameter::from_vec(vec![1.0]);
        let mut p1 = Parameter::from_vec(vec![1.0]);
        p0.set_grad(arr1(&[10.0]));
        p1.set_grad(arr1(&[5.0]));
        let mut groups = vec![group_of(vec![p0, p1])];

        let _ = clip_grad_norm(&mut groups, 1.0);

        let g0 = groups[0].params[0].dense_grad().unwrap()[0];
        let g1 = groups[0].params[1].dense_grad().unwrap()[0];
        assert_abs_diff_eq!(g0 / g1, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clip_grad_norm_zero_max_norm_reports_only() {
        let mut p0 = Parameter::from_vec(vec![1.0]);
        p0.set_grad(arr1(&[5.0]));
        let mut groups = vec![group_of(vec![p0])];

        let global_norm = clip_grad_norm(&mut groups, 0.0);

        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
        // non-positive max_norm never modifies gradients
        assert_abs_diff_eq!(groups[0].params[0].dense_grad().unwrap()[0], 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_exactly_at_threshold() {
        let mut p0 = Parameter::from_vec(vec![1.0, 1.0]);
        p0.set_grad(arr1(&[3.0, 4.0]));
        let mut groups = vec![group_of(vec![p0])];

        let global_norm = clip_grad_norm(&mut groups, 5.0);

        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
        // norm == max_norm is not clipped
        assert_abs_diff_eq!(groups[0].params[0].dense_grad().unwrap()[0], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_spans_groups() {
        let mut p0 = Parameter::from_vec(vec![1.0]);
        let mut p1 = Parameter::from_vec(vec![1.0]);
        p0.set_grad(arr1(&[3.0]));
        p1.set_grad(arr1(&[4.0]));
        let mut groups = vec![group_of(vec![p0]), group_of(vec![p1])];

        let global_norm = clip_grad_norm(&mut groups, 1.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(groups[0].params[0].dense_grad().unwrap()[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(groups[1].params[0].dense_grad().unwrap()[0], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_clip_grad_norm_includes_sparse_values() {
        let mut p0 = Parameter::from_vec(vec![1.0, 1.0]);
        p0.set_sparse_grad(vec![0, 1], vec![3.0, 4.0]);
        let mut groups = vec![group_of(vec![p0])];

        let global_norm = clip_grad_norm(&mut groups, 0.0);
        assert_abs_diff_eq!(global_norm, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_multiply_grads_identity_is_bit_exact() {
        let mut p0 = Parameter::from_vec(vec![1.0, 2.0]);
        p0.set_grad(arr1(&[0.333_771_7, -1.25e-7]));
        let mut groups = vec![group_of(vec![p0])];
        let before: Vec<u32> = groups[0].params[0]
            .dense_grad()
            .unwrap()
            .iter()
            .map(|g| g.to_bits())
            .collect();

        multiply_grads(&mut groups, 1.0);

        let after: Vec<u32> = groups[0].params[0]
            .dense_grad()
            .unwrap()
            .iter()
            .map(|g| g.to_bits())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_multiply_grads_scales_dense_and_sparse() {
        let mut p0 = Parameter::from_vec(vec![1.0, 1.0]);
        let mut p1 = Parameter::from_vec(vec![1.0, 1.0]);
        p0.set_grad(arr1(&[2.0, 4.0]));
        p1.set_sparse_grad(vec![1], vec![6.0]);
        let mut groups = vec![group_of(vec![p0, p1])];

        multiply_grads(&mut groups, 0.5);

        let dense = groups[0].params[0].dense_grad().unwrap();
        assert_abs_diff_eq!(dense[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(dense[1], 2.0, epsilon = 1e-6);
        match &groups[0].params[1].grad {
            Some(Gradient::Sparse { values, .. }) => {
                assert_abs_diff_eq!(values[0], 3.0, epsilon = 1e-6);
            }
            other => panic!("expected sparse gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_grad_drops_all() {
        let mut p0 = Parameter::from_vec(vec![1.0]);
        p0.set_grad(arr1(&[1.0]));
        let mut groups = vec![group_of(vec![p0])];

        zero_grad(&mut groups);
        assert!(groups[0].params[0].grad.is_none());
    }
}
