mod exact;
mod randomized;

pub use exact::ExactSvd;
pub use randomized::{DEFAULT_NITER, RandomizedSvd};

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2};

use crate::{DecompErr, Result};

/// The leading singular triplets of an `(m, n)` matrix, `a ~ u diag(s) v^t`.
#[derive(Debug, Clone)]
pub struct SvdFactors {
    /// The `(m, q)` left singular vectors.
    pub u: Array2<f32>,
    /// The `q` singular values in descending order.
    pub s: Array1<f32>,
    /// The `(n, q)` right singular vectors.
    pub v: Array2<f32>,
}

impl SvdFactors {
    /// Returns the amount of singular triplets held.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// Rebuilds the `(m, n)` approximation `u diag(s) v^t`.
    pub fn reconstruct(&self) -> Array2<f32> {
        (&self.u * &self.s).dot(&self.v.t())
    }
}

/// A truncated singular value decomposition capability.
///
/// Implementors may be randomized, in which case they should own their source of randomness
/// so the caller decides about reproducibility.
pub trait LowRankSvd {
    /// Should approximate the `rank` leading singular triplets of `a`.
    ///
    /// # Arguments
    /// * `a` - The `(m, n)` matrix to decompose.
    /// * `rank` - The amount of singular triplets to keep, `1 <= rank <= min(m, n)`.
    ///
    /// # Returns
    /// The factors or an error if the rank is out of range or the backend fails.
    fn svd_lowrank(&mut self, a: ArrayView2<'_, f32>, rank: usize) -> Result<SvdFactors>;
}

impl<F> LowRankSvd for F
where
    F: FnMut(ArrayView2<'_, f32>, usize) -> Result<SvdFactors>,
{
    fn svd_lowrank(&mut self, a: ArrayView2<'_, f32>, rank: usize) -> Result<SvdFactors> {
        self(a, rank)
    }
}

/// Checks that `rank` is feasible for a matrix of the given dimensions.
pub(crate) fn check_rank(dim: (usize, usize), rank: usize) -> Result<()> {
    let max = dim.0.min(dim.1);
    if rank == 0 || rank > max {
        return Err(DecompErr::RankOutOfRange { rank, max });
    }

    Ok(())
}

fn to_dmatrix(a: ArrayView2<'_, f32>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| f64::from(a[(i, j)]))
}

fn to_array2(a: &DMatrix<f64>, ncols: usize) -> Array2<f32> {
    Array2::from_shape_fn((a.nrows(), ncols), |(i, j)| a[(i, j)] as f32)
}

/// Runs the thin SVD of `a` and keeps its `rank` leading triplets.
///
/// `basis` optionally holds an orthonormal `q` such that `a = q^t x`, the left singular vectors
/// are then lifted back to those of `x` as `q u`.
fn truncated_svd(
    a: DMatrix<f64>,
    basis: Option<&DMatrix<f64>>,
    rank: usize,
) -> Result<SvdFactors> {
    let svd = a.svd(true, true);
    let u = svd.u.ok_or(DecompErr::Svd("left singular vectors were not computed"))?;
    let v_t = svd
        .v_t
        .ok_or(DecompErr::Svd("right singular vectors were not computed"))?;

    if svd.singular_values.len() < rank {
        return Err(DecompErr::Svd("backend returned fewer singular values than requested"));
    }

    let u = match basis {
        Some(q) => q * u,
        None => u,
    };

    let s = Array1::from_iter(svd.singular_values.iter().take(rank).map(|&s| s as f32));
    let u = to_array2(&u, rank);
    let v = to_array2(&v_t.transpose(), rank);

    Ok(SvdFactors { u, s, v })
}
