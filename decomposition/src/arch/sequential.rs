use ndarray::{ArrayD, ArrayViewD};

use super::layers::Linear;
use crate::{DecompErr, Result};

/// A sequential model: information flows forward through its layers, the output of each
/// layer being the input of the next one.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Linear>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if it's empty or two consecutive layers
    /// don't agree on their shared dimension.
    pub fn new<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Linear>,
    {
        let layers: Vec<_> = layers.into_iter().collect();

        if layers.is_empty() {
            return Err(DecompErr::ZeroDim { what: "layers" });
        }

        for pair in layers.windows(2) {
            if pair[0].dim_out() != pair[1].dim_in() {
                return Err(DecompErr::SizeMismatch {
                    what: "consecutive layers",
                    got: pair[1].dim_in(),
                    expected: pair[0].dim_out(),
                });
            }
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Linear::size).sum()
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The input data, of shape `(..., dim_in)` of the first layer.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&self, x: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>> {
        let (first, rest) = self
            .layers
            .split_first()
            .ok_or(DecompErr::ZeroDim { what: "layers" })?;

        let mut y = first.forward(x)?;
        for layer in rest {
            y = layer.forward(y.view())?;
        }

        Ok(y)
    }
}
