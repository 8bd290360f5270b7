// End-to-end pipeline composition: sample → vectorize → cluster → evaluate,
// all through the public API with a real (temp-dir) CSV cache.

use thatch::cache::{AssignmentCache, CsvCache};
use thatch::cluster::runner::ClusterRunner;
use thatch::cluster::{model_key, NOISE_CLUSTER};
use thatch::corpus::{sample, Document};
use thatch::eval::evaluate;
use thatch::vectorize::{build_matrix, Measure, NgramParams};

fn doc(id: &str, text: &str, astroturf: Option<bool>) -> Document {
    Document {
        docid: id.to_string(),
        text: text.to_string(),
        dupe_count: None,
        is_astroturf: astroturf,
    }
}

/// Two form-letter campaigns (near-duplicates with per-document filler) and
/// two organic one-off comments, ground-truth labeled accordingly.
fn labeled_corpus() -> Vec<Document> {
    let mut docs = Vec::new();
    for i in 0..5 {
        docs.push(doc(
            &format!("turf_a{i}"),
            &format!("repeal destroys fair internet access nationwide variant{i}"),
            Some(true),
        ));
    }
    for i in 0..5 {
        docs.push(doc(
            &format!("turf_b{i}"),
            &format!("neutrality rules protect everyday broadband consumers copy{i}"),
            Some(true),
        ));
    }
    docs.push(doc(
        "organic0",
        "my grandmother cannot stream her medical appointments anymore",
        Some(false),
    ));
    docs.push(doc(
        "organic1",
        "please consider rural latency when drafting these regulations",
        Some(false),
    ));
    docs
}

#[test]
fn full_pipeline_with_csv_cache() {
    let dir = tempfile::tempdir().unwrap();
    let docs = labeled_corpus();

    // Persist and reload the sample the way the CLI does.
    sample::save(dir.path(), &docs).unwrap();
    let loaded = sample::load(dir.path()).unwrap();
    assert_eq!(loaded.len(), docs.len());

    // Vectorize.
    let params = NgramParams::new(1).unwrap();
    let measure = Measure::Tf;
    let matrix = build_matrix(&loaded, &params, measure, 0.0);
    assert_eq!(matrix.n_rows(), 12);
    assert!(matrix.n_cols() > 0);

    // Cluster under the derived model key.
    let model = model_key("word", 1, measure);
    assert_eq!(model, "word_1_tf");
    let cache = CsvCache::new(dir.path());
    let runner = ClusterRunner::with_min_cluster_size(&cache, 3);
    let assignments = runner.run(&matrix, &model).unwrap();

    // Shape: one row per document, in sample order.
    assert_eq!(assignments.len(), 12);
    for (a, d) in assignments.iter().zip(&loaded) {
        assert_eq!(a.docid, d.docid);
    }

    // Each form-letter family is dense and homogeneous: all of its members
    // land in a single cluster (whatever id it got).
    let label_of = |id: &str| {
        assignments
            .iter()
            .find(|a| a.docid == id)
            .map(|a| a.cluster)
            .unwrap()
    };
    for i in 1..5 {
        assert_eq!(label_of("turf_a0"), label_of(&format!("turf_a{i}")));
        assert_eq!(label_of("turf_b0"), label_of(&format!("turf_b{i}")));
    }

    // The two campaigns are far apart in gram space; at least one of them
    // must surface as a real cluster.
    assert!(
        assignments.iter().any(|a| a.cluster != NOISE_CLUSTER),
        "expected at least one dense cluster: {assignments:?}"
    );

    // The cache entry exists and replays verbatim.
    assert!(cache.exists(&model));
    let replay = runner.run(&matrix, &model).unwrap();
    assert_eq!(replay, assignments);

    // Evaluate against the ground truth. All 12 documents are labeled, so
    // the confusion matrix accounts for every row.
    let report = evaluate(&model, &assignments, &loaded).unwrap();
    assert_eq!(report.unlabeled, 0);
    assert_eq!(report.confusion.total(), 12);
    for score in [
        report.confusion.precision(),
        report.confusion.recall(),
        report.confusion.f1(),
    ] {
        assert!((0.0..=1.0).contains(&score));
    }

    // Composition rows cover every assigned label exactly once.
    let distinct_labels: std::collections::HashSet<i32> =
        assignments.iter().map(|a| a.cluster).collect();
    assert_eq!(report.compositions.len(), distinct_labels.len());
    let total_members: usize = report.compositions.iter().map(|c| c.size).sum();
    assert_eq!(total_members, 12);
}

#[test]
fn stale_cache_hazard_survives_process_boundaries() {
    // Re-create the runner (as a fresh CLI invocation would) and confirm
    // the cache still answers for the key even with different input.
    let dir = tempfile::tempdir().unwrap();
    let docs = labeled_corpus();
    let params = NgramParams::new(1).unwrap();
    let matrix = build_matrix(&docs, &params, Measure::Tf, 0.0);

    let first = {
        let cache = CsvCache::new(dir.path());
        let runner = ClusterRunner::with_min_cluster_size(&cache, 3);
        runner.run(&matrix, "word_1_tf").unwrap()
    };

    let shrunk: Vec<Document> = docs.into_iter().take(4).collect();
    let other_matrix = build_matrix(&shrunk, &params, Measure::Tf, 0.0);
    let second = {
        let cache = CsvCache::new(dir.path());
        let runner = ClusterRunner::with_min_cluster_size(&cache, 3);
        runner.run(&other_matrix, "word_1_tf").unwrap()
    };

    // 12 rows from the first run, not 4 from the second input.
    assert_eq!(second.len(), first.len());
    assert_eq!(second, first);
}
