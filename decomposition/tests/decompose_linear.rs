use decomposition::{
    DecompErr, decompose_linear,
    arch::layers::Linear,
    svd::{ExactSvd, LowRankSvd, RandomizedSvd},
};
use ndarray::{Array2, ArrayD, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};

fn seeded_layer(dim_in: usize, dim_out: usize, bias: bool) -> Linear {
    let mut rng = StdRng::seed_from_u64(42);
    Linear::random(dim_in, dim_out, bias, &mut rng).unwrap()
}

fn frobenius(a: ArrayView2<'_, f32>) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn max_abs_diff(a: &ArrayD<f32>, b: &ArrayD<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0., f32::max)
}

#[test]
fn full_rank_reconstructs_weight() {
    let layer = seeded_layer(12, 20, true);
    let factorized = decompose_linear(&layer, 12, &mut ExactSvd).unwrap();
    let diff = &layer.weight() - &factorized.weight();

    assert!(diff.iter().all(|d| d.abs() < 1e-4));
}

#[test]
fn full_rank_randomized_reconstructs_weight() {
    let layer = seeded_layer(20, 12, false);
    let mut svd = RandomizedSvd::new(StdRng::seed_from_u64(1));
    let factorized = decompose_linear(&layer, 12, &mut svd).unwrap();
    let diff = &layer.weight() - &factorized.weight();

    assert!(diff.iter().all(|d| d.abs() < 1e-3));
}

#[test]
fn truncation_error_matches_discarded_spectrum() {
    let layer = seeded_layer(16, 24, false);
    let spectrum = ExactSvd.svd_lowrank(layer.weight(), 16).unwrap().s;

    for rank in [2, 5, 9, 15] {
        let factorized = decompose_linear(&layer, rank, &mut ExactSvd).unwrap();
        let err = frobenius((&layer.weight() - &factorized.weight()).view());
        let discarded = spectrum
            .iter()
            .skip(rank)
            .map(|s| s * s)
            .sum::<f32>()
            .sqrt();

        assert!(
            (err - discarded).abs() <= 1e-3 * discarded.max(1.),
            "rank {rank}: err {err}, discarded {discarded}"
        );
    }
}

#[test]
fn error_does_not_increase_with_rank() {
    let layer = seeded_layer(10, 30, true);

    let errors: Vec<f32> = (1..=10)
        .map(|rank| {
            let factorized = decompose_linear(&layer, rank, &mut ExactSvd).unwrap();
            frobenius((&layer.weight() - &factorized.weight()).view())
        })
        .collect();

    for pair in errors.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-5, "errors {errors:?}");
    }
}

#[test]
fn bias_is_carried_by_second_layer_only() {
    let with_bias = seeded_layer(8, 6, true);
    let factorized = decompose_linear(&with_bias, 3, &mut ExactSvd).unwrap();

    assert!(!factorized.first().has_bias());
    assert_eq!(factorized.second().bias(), with_bias.bias());

    let without_bias = seeded_layer(8, 6, false);
    let factorized = decompose_linear(&without_bias, 3, &mut ExactSvd).unwrap();

    assert!(!factorized.first().has_bias());
    assert!(!factorized.second().has_bias());
}

#[test]
fn reference_scenario_shapes() {
    let layer = seeded_layer(48, 192, true);
    let mut svd = RandomizedSvd::new(StdRng::seed_from_u64(0));
    let factorized = decompose_linear(&layer, 24, &mut svd).unwrap();

    assert_eq!(factorized.first().weight().dim(), (24, 48));
    assert_eq!(factorized.second().weight().dim(), (192, 24));

    let x = ArrayD::<f32>::ones(vec![4, 16, 16, 48]);
    let y = layer.forward(x.view()).unwrap();
    let y_hat = factorized.forward(x.view()).unwrap();

    assert_eq!(y.shape(), &[4, 16, 16, 192]);
    assert_eq!(y.shape(), y_hat.shape());
}

#[test]
fn reference_scenario_without_truncation() {
    let layer = seeded_layer(48, 192, true);
    let factorized = decompose_linear(&layer, 48, &mut ExactSvd).unwrap();

    let x = ArrayD::<f32>::ones(vec![4, 16, 16, 48]);
    let y = layer.forward(x.view()).unwrap();
    let y_hat = factorized.forward(x.view()).unwrap();
    let weight_diff = &layer.weight() - &factorized.weight();

    assert!(max_abs_diff(&y, &y_hat) < 1e-3);
    assert!(weight_diff.iter().all(|d| d.abs() < 1e-4));
}

#[test]
fn redecomposing_reproduces_product() {
    let layer = seeded_layer(14, 9, true);
    let factorized = decompose_linear(&layer, 4, &mut ExactSvd).unwrap();

    let product = Linear::new(factorized.weight(), None).unwrap();
    let again = decompose_linear(&product, 4, &mut ExactSvd).unwrap();
    let diff = &factorized.weight() - &again.weight();

    let s1 = ExactSvd.svd_lowrank(factorized.weight().view(), 4).unwrap().s;
    let s2 = ExactSvd.svd_lowrank(again.weight().view(), 4).unwrap().s;

    assert!(diff.iter().all(|d| d.abs() < 1e-4));
    assert!(s1.iter().zip(&s2).all(|(a, b)| (a - b).abs() < 1e-4));
}

#[test]
fn source_layer_is_untouched() {
    let layer = seeded_layer(6, 5, true);
    let before = layer.clone();
    let _ = decompose_linear(&layer, 2, &mut ExactSvd).unwrap();

    assert_eq!(layer, before);
}

#[test]
fn out_of_range_rank() {
    let layer = seeded_layer(6, 5, true);

    assert!(matches!(
        decompose_linear(&layer, 0, &mut ExactSvd),
        Err(DecompErr::RankOutOfRange { rank: 0, max: 5 })
    ));
    assert!(matches!(
        decompose_linear(&layer, 6, &mut ExactSvd),
        Err(DecompErr::RankOutOfRange { rank: 6, max: 5 })
    ));
}

#[test]
fn injected_capability_is_used() {
    let layer = seeded_layer(4, 4, false);
    let mut ranks = Vec::new();
    let mut svd = |a: ArrayView2<'_, f32>, rank: usize| {
        ranks.push(rank);
        ExactSvd.svd_lowrank(a, rank)
    };

    let factorized = decompose_linear(&layer, 3, &mut svd).unwrap();

    assert_eq!(factorized.rank(), 3);
    assert_eq!(ranks, [3]);
}

#[test]
fn boxed_capability() {
    let layer = seeded_layer(7, 3, true);
    let mut svd: Box<dyn LowRankSvd> = Box::new(ExactSvd);
    let factorized = decompose_linear(&layer, 3, &mut *svd).unwrap();

    let diff: Array2<f32> = &layer.weight() - &factorized.weight();
    assert!(diff.iter().all(|d| d.abs() < 1e-4));
}
