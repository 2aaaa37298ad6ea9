pub mod arch;
pub mod config;
mod decompose;
pub mod error;
pub mod svd;

pub use decompose::{Factorized, decompose_linear};
pub use error::{DecompErr, Result};
