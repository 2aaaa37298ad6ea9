use log::debug;
use ndarray::ArrayView2;

use super::{LowRankSvd, SvdFactors, check_rank, to_dmatrix, truncated_svd};
use crate::Result;

/// A deterministic truncated SVD: computes the full thin decomposition and keeps the leading
/// singular triplets.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactSvd;

impl ExactSvd {
    pub fn new() -> Self {
        Self
    }
}

impl LowRankSvd for ExactSvd {
    fn svd_lowrank(&mut self, a: ArrayView2<'_, f32>, rank: usize) -> Result<SvdFactors> {
        check_rank(a.dim(), rank)?;
        debug!(rows = a.nrows(), cols = a.ncols(), rank = rank; "exact svd");

        truncated_svd(to_dmatrix(a), None, rank)
    }
}
