use std::{env, fs};

use anyhow::Context;
use decomposition::{arch::layers::Linear, config::SvdConfig, decompose_linear};
use log::info;
use ndarray::ArrayD;
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;

/// Parameters of the check run, every field can be overridden from a JSON file.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    dim_in: usize,
    dim_out: usize,
    bias: bool,
    /// The leading axes of the all-ones input, the last one being `dim_in`.
    batch: Vec<usize>,
    rank: usize,
    seed: Option<u64>,
    svd: SvdConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            dim_in: 48,
            dim_out: 192,
            bias: true,
            batch: vec![4, 16, 16],
            rank: 24,
            seed: None,
            svd: SvdConfig::default(),
        }
    }
}

fn load_config(path: &str) -> anyhow::Result<DemoConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("cannot read '{path}'"))?;
    serde_json::from_str(&content).with_context(|| format!("invalid config '{path}'"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => DemoConfig::default(),
    };
    info!("running with {config:?}");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let layer = Linear::random(config.dim_in, config.dim_out, config.bias, &mut rng)?;
    let mut svd = config.svd.build();
    let factorized = decompose_linear(&layer, config.rank, &mut *svd)?;

    let mut shape = config.batch;
    shape.push(config.dim_in);
    let x = ArrayD::<f32>::ones(shape);

    let y = layer.forward(x.view())?;
    let y_hat = factorized.forward(x.view())?;
    let output_diff = (&y - &y_hat).sum();
    let weight_diff = (&layer.weight() - &factorized.weight()).sum();

    println!("Output diff {output_diff:.4}");
    println!("Weight diff: {weight_diff:.4}");
    println!(
        "Params: {} -> {} (rank {})",
        layer.size(),
        factorized.size(),
        factorized.rank()
    );

    Ok(())
}
