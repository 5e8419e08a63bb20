//! Parameter and gradient value types.

use ndarray::Array1;

/// Gradient attached to a parameter.
///
/// The optimizer accumulates densely; the sparse representation exists so
/// callers can hand one over and get a typed rejection instead of silent
/// corruption.
#[derive(Debug, Clone)]
pub enum Gradient {
    /// Dense elementwise gradient
    Dense(Array1<f32>),
    /// Sparse gradient as aligned index/value pairs
    Sparse {
        /// Element indices
        indices: Vec<usize>,
        /// Values aligned with `indices`
        values: Vec<f32>,
    },
}

/// A trainable parameter with an optional gradient
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Parameter values
    pub data: Array1<f32>,
    /// Current gradient, if any
    pub grad: Option<Gradient>,
}

impl Parameter {
    /// Create a parameter from an array
    #[must_use]
    pub fn new(data: Array1<f32>) -> Self {
        Self { data, grad: None }
    }

    /// Create a parameter from raw values
    #[must_use]
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self::new(Array1::from(data))
    }

    /// Attach a dense gradient
    pub fn set_grad(&mut self, grad: Array1<f32>) {
        self.grad = Some(Gradient::Dense(grad));
    }

    /// Attach a sparse gradient
    pub fn set_sparse_grad(&mut self, indices: Vec<usize>, values: Vec<f32>) {
        self.grad = Some(Gradient::Sparse { indices, values });
    }

    /// Drop the current gradient
    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    /// Dense gradient view, if one is attached
    #[must_use]
    pub fn dense_grad(&self) -> Option<&Array1<f32>> {
        match &self.grad {
            Some(Gradient::Dense(grad)) => Some(grad),
            _ => None,
        }
    }
}
