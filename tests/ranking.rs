use approx::assert_abs_diff_eq;
use fsauc::passes::shuffled_passes;
use fsauc::{
    FeatureMatrix, OptimizerConfig, SparseRows, TrainingSet, evaluate_auc, roc_auc, train_ranker,
};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const POSITIVE_CENTER: [f64; 4] = [0.5, 0.5, 0.5, 0.0];
const NEGATIVE_CENTER: [f64; 4] = [-0.5, 0.0, -0.5, -0.5];

fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Bounded clusters in four dimensions. Coordinates where a center is zero stay
/// exactly zero, so the same matrix is also a meaningful sparse input.
fn clusters(n: usize, prevalence: f64, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_pos = (n as f64 * prevalence).round() as usize;
    let mut x = Array2::zeros((n, 4));
    let mut y = Array1::from_elem(n, -1.0);
    for i in 0..n {
        let center = if i < n_pos {
            y[i] = 1.0;
            &POSITIVE_CENTER
        } else {
            &NEGATIVE_CENTER
        };
        for (j, &c) in center.iter().enumerate() {
            if c != 0.0 {
                x[[i, j]] = c + rng.gen_range(-0.1..=0.1);
            }
        }
    }
    (x, y)
}

#[test]
fn dense_and_sparse_inputs_learn_the_same_ranker() {
    init_logging();
    let (x, y) = clusters(200, 0.5, 11);
    let (x_test, y_test) = clusters(200, 0.5, 12);

    let dense = TrainingSet::dense(x.clone(), y.view()).unwrap();
    let sparse = TrainingSet::sparse(SparseRows::from_dense(&x), y.view()).unwrap();
    let held_out = TrainingSet::dense(x_test, y_test.view()).unwrap();

    let config = OptimizerConfig::with_shuffled_passes(200, 100, 5, 0.1, 10.0);
    let from_dense = train_ranker(&dense, &config).unwrap();
    let from_sparse = train_ranker(&sparse, &config).unwrap();

    for (a, b) in from_dense.weights.iter().zip(from_sparse.weights.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-8);
    }
    assert_eq!(evaluate_auc(&from_dense, &held_out), 1.0);
    assert_eq!(evaluate_auc(&from_sparse, &held_out), 1.0);
}

#[test]
fn imbalanced_classes_still_rank_perfectly() {
    init_logging();
    let (x, y) = clusters(200, 0.1, 21);
    let (x_test, y_test) = clusters(200, 0.1, 22);
    let train = TrainingSet::dense(x, y.view()).unwrap();
    let config = OptimizerConfig::with_shuffled_passes(train.len(), 100, 8, 0.1, 10.0);

    let ranker = train_ranker(&train, &config).unwrap();
    let features = FeatureMatrix::Dense(x_test);
    let scores = ranker.score(&features).unwrap();
    let test = TrainingSet::new(features, y_test.view()).unwrap();
    assert_eq!(roc_auc(scores.view(), test.labels()).unwrap(), 1.0);

    for stage in &ranker.stages {
        assert!((0.0..=1.0).contains(&stage.prevalence));
        assert_abs_diff_eq!(stage.prevalence, 0.1, epsilon = 1e-12);
    }
    assert!(ranker.weights.iter().map(|w| w.abs()).sum::<f64>() <= 10.0 + 1e-9);
}

#[test]
fn run_from_a_toml_config_file() {
    init_logging();
    let (x, y) = clusters(60, 0.5, 31);
    let data = TrainingSet::dense(x, y.view()).unwrap();

    let ids = shuffled_passes(60, 20, 2)
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(
        &path,
        format!("ids = [{ids}]\neta = 0.2\nbeta = 3.0\nn_pass = 20\nrec = 0.5\n"),
    )
    .unwrap();

    let config = OptimizerConfig::load(&path).unwrap();
    assert_eq!(config.l1_radius, 3.0);
    let first = train_ranker(&data, &config).unwrap();
    let second = train_ranker(&data, &OptimizerConfig::load(&path).unwrap()).unwrap();
    assert_eq!(first, second);
    assert!(first.is_finite());
}
