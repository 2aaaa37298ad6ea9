use ndarray::{linalg, prelude::*};
use rand::Rng;
use rand_distr::Uniform;

use crate::{DecompErr, Result};

/// An affine projection `y = x W^t + b` between fixed-size feature spaces.
///
/// The weight is stored as `(dim_out, dim_in)`, rows being output channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    weight: Array2<f32>,
    bias: Option<Array1<f32>>,
}

impl Linear {
    /// Creates a new `Linear` from its parameters.
    ///
    /// # Arguments
    /// * `weight` - The `(dim_out, dim_in)` weight matrix.
    /// * `bias` - An optional bias of length `dim_out`.
    ///
    /// # Returns
    /// A new `Linear` instance or an error if any dimension is zero or the bias length
    /// doesn't match the output dimension.
    pub fn new(weight: Array2<f32>, bias: Option<Array1<f32>>) -> Result<Self> {
        let (dim_out, dim_in) = weight.dim();

        if dim_in == 0 {
            return Err(DecompErr::ZeroDim { what: "input" });
        }

        if dim_out == 0 {
            return Err(DecompErr::ZeroDim { what: "output" });
        }

        if let Some(ref b) = bias
            && b.len() != dim_out
        {
            return Err(DecompErr::SizeMismatch {
                what: "bias",
                got: b.len(),
                expected: dim_out,
            });
        }

        Ok(Self { weight, bias })
    }

    /// Creates a new `Linear` with the default dense layer initialization, every parameter
    /// is sampled from `U(-1/sqrt(dim_in), 1/sqrt(dim_in))`.
    ///
    /// # Arguments
    /// * `dim_in` - The amount of input features.
    /// * `dim_out` - The amount of output features.
    /// * `bias` - Whether the layer has a bias.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// A new `Linear` instance or an error if any dimension is zero.
    pub fn random<R: Rng + ?Sized>(
        dim_in: usize,
        dim_out: usize,
        bias: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if dim_in == 0 {
            return Err(DecompErr::ZeroDim { what: "input" });
        }

        let bound = 1. / (dim_in as f32).sqrt();
        let dist = Uniform::new(-bound, bound)?;

        let weight = Array2::from_shape_simple_fn((dim_out, dim_in), || rng.sample(&dist));
        let bias = bias.then(|| Array1::from_shape_simple_fn(dim_out, || rng.sample(&dist)));

        Self::new(weight, bias)
    }

    pub fn dim_in(&self) -> usize {
        self.weight.ncols()
    }

    pub fn dim_out(&self) -> usize {
        self.weight.nrows()
    }

    pub fn weight(&self) -> ArrayView2<'_, f32> {
        self.weight.view()
    }

    pub fn bias(&self) -> Option<ArrayView1<'_, f32>> {
        self.bias.as_ref().map(|b| b.view())
    }

    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.weight.len() + self.bias.as_ref().map_or(0, |b| b.len())
    }

    /// Applies the projection over the last axis of `x`.
    ///
    /// # Arguments
    /// * `x` - An input of shape `(..., dim_in)`.
    ///
    /// # Returns
    /// The output of shape `(..., dim_out)` or an error if the last axis of `x` isn't `dim_in`.
    pub fn forward(&self, x: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>> {
        let features = x.shape().last().copied().unwrap_or(0);
        if x.ndim() == 0 || features != self.dim_in() {
            return Err(DecompErr::SizeMismatch {
                what: "input features",
                got: features,
                expected: self.dim_in(),
            });
        }

        let rows = x.len() / features;
        let flat = x.to_shape((rows, features))?;
        let y = self.forward_batch(flat.view())?;

        let mut shape = x.shape().to_vec();
        let last = shape.len() - 1;
        shape[last] = self.dim_out();

        Ok(y.into_shape_with_order(shape)?)
    }

    /// Applies the projection to each row of `x`.
    ///
    /// # Arguments
    /// * `x` - A batch of shape `(n, dim_in)`.
    ///
    /// # Returns
    /// The `(n, dim_out)` output or an error if the columns of `x` aren't `dim_in`.
    pub fn forward_batch(&self, x: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim_in() {
            return Err(DecompErr::SizeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: self.dim_in(),
            });
        }

        let mut y = Array2::zeros((x.nrows(), self.dim_out()));
        linalg::general_mat_mul(1.0, &x, &self.weight.t(), 0.0, &mut y);

        if let Some(ref b) = self.bias {
            y += b;
        }

        Ok(y)
    }
}
