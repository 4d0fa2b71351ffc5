//! End-to-end: config -> hyperedge file -> artifacts -> dataset -> GSO selection.

use std::fs;
use std::path::PathBuf;

use hgsl_data::artifacts::{load_artifacts, save_artifacts};
use hgsl_data::config::parse_config;
use hgsl_data::source_loc::Split;
use hgsl_data::{
    fold_path, load_hypergraph, GnnModel, GsoCollection, IncidenceCollection, SourceLocalization,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hgsl-pipeline-{}-{}", tag, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn config_to_dataset_and_operators() {
    let dir = scratch_dir("full");
    let edges = dir.join("edges.json");
    fs::write(&edges, r#"[["a", "b", "c"], ["c", "d"], ["d", "e", "f"], ["f", "a"], [7, "b"]]"#).unwrap();

    let toml = format!(
        r#"
        [dataset]
        hyperedge_path = "{edges}"
        matrix_path = "{matrix}"
        data_path = "{data}"
        n_train = 12
        n_valid = 4
        n_test = 4
        source_edges = [0, 2, 4]
        noise = {{ mean = 0.0, variance = 0.0001 }}
        seed = 11

        [experiments.hglap]
        gnn_model = "LocalGNNHGLap"
        loss_function = "CE"
        "#,
        edges = edges.display(),
        matrix = dir.join("sourceLoc").display(),
        data = dir.join("sourceLoc_data.json").display(),
    );
    let config = parse_config(&toml).unwrap();
    let ds = &config.dataset;

    let hg = load_hypergraph(&ds.hyperedge_path).unwrap();
    assert_eq!(hg.n(), 7);
    assert_eq!(hg.m(), 5);

    save_artifacts(
        &ds.matrix_path,
        &GsoCollection::from_hypergraph(&hg),
        &IncidenceCollection::from_hypergraph(&hg),
    )
    .unwrap();
    let (gsos, incidence) = load_artifacts(&ds.matrix_path).unwrap();
    assert_eq!(incidence.incidence().unwrap(), hg.incidence_matrix());

    let model = config.experiments["hglap"].learner.gnn_model;
    assert_eq!(model, GnnModel::LocalGnnHgLap);
    let selected = model.select_gsos(&gsos, &incidence).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].shape(), (7, 7));

    let mut rng = ChaCha8Rng::seed_from_u64(ds.seed);
    let data = SourceLocalization::generate(&hg, &ds.source_loc_params(), &mut rng).unwrap();
    assert_eq!(data.t_max(), 7);
    assert_eq!(data.n_classes(), 3);
    data.save(&ds.data_path).unwrap();

    let back = SourceLocalization::load(&ds.data_path).unwrap();
    let (signals, labels) = back.samples(Split::Valid);
    assert_eq!(signals.dim(), (4, 1, 7));
    assert!(labels.iter().all(|&l| l < 3));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn same_seed_same_dataset() {
    let dir = scratch_dir("seed");
    let edges = dir.join("edges.json");
    fs::write(&edges, "[[0, 1, 2], [2, 3], [3, 4, 0]]").unwrap();
    let hg = load_hypergraph(&edges).unwrap();

    let toml = format!(
        "[dataset]\nhyperedge_path = \"{}\"\nsource_edges = [0, 1, 2]\nn_train = 5\nn_valid = 2\nn_test = 2\n",
        edges.display()
    );
    let params = parse_config(&toml).unwrap().dataset.source_loc_params();
    let a = SourceLocalization::generate(&hg, &params, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    let b = SourceLocalization::generate(&hg, &params, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn folds_and_normalization_follow_the_config() {
    let dir = scratch_dir("folds");
    let edges = dir.join("edges.json");
    fs::write(&edges, "[[0, 1, 2], [2, 3], [3, 4, 0]]").unwrap();
    let hg = load_hypergraph(&edges).unwrap();

    let toml = format!(
        "[dataset]\nhyperedge_path = \"{}\"\nsource_edges = [0, 2]\nn_train = 6\nn_valid = 3\nn_test = 2\nnum_folds = 3\nnormalize_graph_signal = true\n",
        edges.display()
    );
    let ds = parse_config(&toml).unwrap().dataset;
    let mut data =
        SourceLocalization::generate(&hg, &ds.source_loc_params(), &mut ChaCha8Rng::seed_from_u64(ds.seed))
            .unwrap();
    assert!(ds.normalize_graph_signal);
    data.normalize_signals();

    let num_folds = ds.num_folds.unwrap();
    for fold in 0..num_folds {
        let view = data.cv_fold(num_folds, fold, ds.seed).unwrap();
        let path = fold_path(&ds.data_path, fold);
        assert!(path.to_string_lossy().ends_with(&format!("_fold{}.json", fold)));
        assert_eq!(view.samples(Split::Valid).1.len(), 3);
        assert_eq!(view.samples(Split::Train).1.len(), 6);
        let (signals, _) = view.samples(Split::Train);
        assert!(signals.iter().all(|v| v.abs() <= 1.0 + 1e-12));
    }

    fs::remove_dir_all(&dir).ok();
}
