use std::{fs, path::Path};

use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;

use crate::{
    Result,
    svd::{DEFAULT_NITER, ExactSvd, LowRankSvd, RandomizedSvd},
};

/// Which truncated SVD to decompose with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SvdConfig {
    Exact,
    Randomized {
        #[serde(default = "default_niter")]
        niter: usize,
        #[serde(default)]
        oversample: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
}

fn default_niter() -> usize {
    DEFAULT_NITER
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self::Randomized {
            niter: DEFAULT_NITER,
            oversample: 0,
            seed: None,
        }
    }
}

impl SvdConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builds the configured truncated SVD.
    ///
    /// # Returns
    /// A boxed `LowRankSvd`, randomized ones without a seed are seeded from the thread rng.
    pub fn build(&self) -> Box<dyn LowRankSvd> {
        match *self {
            SvdConfig::Exact => Box::new(ExactSvd),
            SvdConfig::Randomized {
                niter,
                oversample,
                seed,
            } => {
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_rng(&mut rand::rng()),
                };

                Box::new(
                    RandomizedSvd::new(rng)
                        .with_niter(niter)
                        .with_oversample(oversample),
                )
            }
        }
    }
}
