use log::debug;
use nalgebra::DMatrix;
use ndarray::ArrayView2;
use rand::Rng;
use rand_distr::StandardNormal;

use super::{LowRankSvd, SvdFactors, check_rank, to_dmatrix, truncated_svd};
use crate::Result;

/// The default amount of subspace iterations, enough for slowly decaying spectra.
pub const DEFAULT_NITER: usize = 2;

/// A randomized truncated SVD.
///
/// Finds an orthonormal basis `q` approximating the range of `a` by projecting it onto a
/// gaussian sketch and refining it with subspace iterations, then solves the small problem
/// `q^t a` exactly. The result is only reproducible if `rng` is seeded.
#[derive(Debug, Clone)]
pub struct RandomizedSvd<R: Rng> {
    rng: R,
    niter: usize,
    oversample: usize,
}

impl<R: Rng> RandomizedSvd<R> {
    /// Creates a new `RandomizedSvd` with `DEFAULT_NITER` iterations and no oversampling.
    ///
    /// # Arguments
    /// * `rng` - The random number generator the sketches are drawn from.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            niter: DEFAULT_NITER,
            oversample: 0,
        }
    }

    /// Sets the amount of subspace iterations.
    pub fn with_niter(mut self, niter: usize) -> Self {
        self.niter = niter;
        self
    }

    /// Sets the amount of extra sketch columns, the sketch never outgrows `min(m, n)`.
    pub fn with_oversample(mut self, oversample: usize) -> Self {
        self.oversample = oversample;
        self
    }

    /// Finds an orthonormal `(m, k)` basis for the dominant range of `a`.
    fn range_finder(&mut self, a: &DMatrix<f64>, k: usize) -> DMatrix<f64> {
        let rng = &mut self.rng;
        let omega = DMatrix::from_fn(a.ncols(), k, |_, _| rng.sample::<f64, _>(StandardNormal));

        let mut q = (a * omega).qr().q();
        for _ in 0..self.niter {
            q = (a.tr_mul(&q)).qr().q();
            q = (a * q).qr().q();
        }

        q
    }
}

impl<R: Rng> LowRankSvd for RandomizedSvd<R> {
    fn svd_lowrank(&mut self, a: ArrayView2<'_, f32>, rank: usize) -> Result<SvdFactors> {
        check_rank(a.dim(), rank)?;

        let (m, n) = a.dim();
        let k = (rank + self.oversample).min(m.min(n));
        debug!(rows = m, cols = n, rank = rank, sketch = k, niter = self.niter; "randomized svd");

        let a = to_dmatrix(a);
        let q = self.range_finder(&a, k);
        let b = q.tr_mul(&a);

        truncated_svd(b, Some(&q), rank)
    }
}
