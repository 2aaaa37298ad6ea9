use log::{debug, warn};
use ndarray::{Array2, ArrayD, ArrayViewD};

use crate::{
    DecompErr, Result,
    arch::{Sequential, layers::Linear},
    svd::{LowRankSvd, SvdFactors, check_rank},
};

/// A linear projection factorized into two consecutive ones through a rank `q` bottleneck.
///
/// `first` projects `dim_in -> q` and never has a bias, `second` projects `q -> dim_out` and
/// carries the bias of the source layer if it had one.
#[derive(Debug, Clone)]
pub struct Factorized {
    first: Linear,
    second: Linear,
}

impl Factorized {
    pub fn first(&self) -> &Linear {
        &self.first
    }

    pub fn second(&self) -> &Linear {
        &self.second
    }

    /// Returns the width of the bottleneck.
    pub fn rank(&self) -> usize {
        self.first.dim_out()
    }

    /// Returns the amount of parameters of both layers.
    pub fn size(&self) -> usize {
        self.first.size() + self.second.size()
    }

    /// The `(dim_out, dim_in)` weight equivalent to applying both layers.
    pub fn weight(&self) -> Array2<f32> {
        self.second.weight().dot(&self.first.weight())
    }

    /// Applies `first` and then `second` over the last axis of `x`.
    pub fn forward(&self, x: ArrayViewD<'_, f32>) -> Result<ArrayD<f32>> {
        let h = self.first.forward(x)?;
        self.second.forward(h.view())
    }

    pub fn into_parts(self) -> (Linear, Linear) {
        (self.first, self.second)
    }

    pub fn into_sequential(self) -> Result<Sequential> {
        Sequential::new([self.first, self.second])
    }
}

/// Decomposes `layer` into two layers through a truncated SVD of its weight.
///
/// With `W ~ U diag(S) V^t`, the first layer gets `V^t` as its weight and the second one
/// `U diag(S)` and the original bias. The source layer is left untouched.
///
/// # Arguments
/// * `layer` - The layer to decompose.
/// * `rank` - The width of the bottleneck, `1 <= rank <= min(dim_in, dim_out)`.
/// * `svd` - The truncated SVD used to factorize the weight.
///
/// # Returns
/// The factorized layer or an error if the rank is out of range or the svd fails.
pub fn decompose_linear<S>(layer: &Linear, rank: usize, svd: &mut S) -> Result<Factorized>
where
    S: LowRankSvd + ?Sized,
{
    let weight = layer.weight();
    let (dim_out, dim_in) = weight.dim();
    check_rank((dim_out, dim_in), rank)?;

    let SvdFactors { u, s, v } = svd.svd_lowrank(weight, rank)?;
    check_factor("u", u.dim(), (dim_out, rank))?;
    check_factor("v", v.dim(), (dim_in, rank))?;
    if s.len() != rank {
        return Err(DecompErr::SizeMismatch {
            what: "singular values",
            got: s.len(),
            expected: rank,
        });
    }

    let first = Linear::new(v.reversed_axes(), None)?;
    let second = Linear::new(u * &s, layer.bias().map(|b| b.to_owned()))?;
    let factorized = Factorized { first, second };

    debug!(
        dim_in = dim_in,
        dim_out = dim_out,
        rank = rank,
        before = layer.size(),
        after = factorized.size();
        "decomposed linear layer"
    );

    if factorized.size() > layer.size() {
        warn!(
            "rank {rank} factorization has {} parameters, more than the {} of the source layer",
            factorized.size(),
            layer.size()
        );
    }

    Ok(factorized)
}

fn check_factor(what: &'static str, got: (usize, usize), expected: (usize, usize)) -> Result<()> {
    if got.0 != expected.0 {
        return Err(DecompErr::SizeMismatch {
            what,
            got: got.0,
            expected: expected.0,
        });
    }

    if got.1 != expected.1 {
        return Err(DecompErr::SizeMismatch {
            what,
            got: got.1,
            expected: expected.1,
        });
    }

    Ok(())
}
