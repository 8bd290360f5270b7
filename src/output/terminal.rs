// Colored terminal output for cluster summaries and evaluation reports.
//
// This module handles all terminal-specific formatting: colors, tables,
// alignment. The main.rs command handlers delegate here.

use std::collections::HashMap;

use colored::Colorize;

use crate::cluster::{ClusterAssignment, NOISE_CLUSTER};
use crate::corpus::Document;
use crate::eval::EvalReport;
use crate::output::truncate_chars;

/// Display the clustering outcome for one model: per-cluster sizes, mean
/// membership, and a representative comment (the member closest to the
/// cluster's centroid) so the analyst can eyeball what each campaign says.
pub fn display_cluster_summary(model: &str, assignments: &[ClusterAssignment], docs: &[Document]) {
    let text_by_docid: HashMap<&str, &str> = docs
        .iter()
        .map(|d| (d.docid.as_str(), d.text.as_str()))
        .collect();

    let mut by_cluster: Vec<(i32, Vec<&ClusterAssignment>)> = {
        let mut map: HashMap<i32, Vec<&ClusterAssignment>> = HashMap::new();
        for a in assignments {
            map.entry(a.cluster).or_default().push(a);
        }
        map.into_iter().collect()
    };
    // Size descending, noise pinned to the end.
    by_cluster.sort_by_key(|(cluster, members)| {
        (*cluster == NOISE_CLUSTER, usize::MAX - members.len())
    });

    println!(
        "\n{}",
        format!(
            "=== Clusters for {} ({} documents) ===",
            model,
            assignments.len()
        )
        .bold()
    );
    println!();
    println!(
        "  {:>8}  {:>6}  {:>10}  {}",
        "Cluster".dimmed(),
        "Size".dimmed(),
        "Mean prob".dimmed(),
        "Representative comment".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (cluster, members) in &by_cluster {
        let mean_prob =
            members.iter().map(|a| a.membership_prob).sum::<f64>() / members.len() as f64;
        let representative = members
            .iter()
            .max_by(|a, b| {
                a.membership_prob
                    .partial_cmp(&b.membership_prob)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .and_then(|a| text_by_docid.get(a.docid.as_str()))
            .map(|text| truncate_chars(text, 44))
            .unwrap_or_default();

        let label = if *cluster == NOISE_CLUSTER {
            "noise".yellow().to_string()
        } else {
            cluster.to_string()
        };
        println!(
            "  {:>8}  {:>6}  {:>10.2}  {}",
            label,
            members.len(),
            mean_prob,
            representative.dimmed(),
        );
    }

    let noise = assignments.iter().filter(|a| a.is_noise()).count();
    let noise_frac = if assignments.is_empty() {
        0.0
    } else {
        noise as f64 / assignments.len() as f64
    };
    println!();
    println!(
        "  {} clusters, {} noise points ({:.0}%)",
        by_cluster
            .iter()
            .filter(|(c, _)| *c != NOISE_CLUSTER)
            .count(),
        noise,
        noise_frac * 100.0,
    );
}

/// Display the evaluation report: confusion matrix plus summary scores.
pub fn display_eval_report(report: &EvalReport) {
    println!(
        "\n{}",
        format!("=== Evaluation for {} ===", report.model).bold()
    );

    let m = &report.confusion;
    println!();
    println!("  {:>24}  {:>10}  {:>10}", "", "astroturf".dimmed(), "organic".dimmed());
    println!(
        "  {:>24}  {:>10}  {:>10}",
        "predicted astroturf".dimmed(),
        m.true_pos,
        m.false_pos
    );
    println!(
        "  {:>24}  {:>10}  {:>10}",
        "predicted organic".dimmed(),
        m.false_neg,
        m.true_neg
    );
    println!();

    let colorize = |v: f64| {
        let s = format!("{v:.3}");
        if v >= 0.8 {
            s.green().to_string()
        } else if v >= 0.5 {
            s.yellow().to_string()
        } else {
            s.red().to_string()
        }
    };
    println!("  Precision: {}", colorize(m.precision()));
    println!("  Recall:    {}", colorize(m.recall()));
    println!("  F1:        {}", colorize(m.f1()));
    if report.unlabeled > 0 {
        println!(
            "  {}",
            format!("({} documents skipped — no ground-truth label)", report.unlabeled).dimmed()
        );
    }

    println!("\n  {}", "Cluster composition".bold());
    println!(
        "  {:>8}  {:>6}  {:>8}  {:>10}",
        "Cluster".dimmed(),
        "Size".dimmed(),
        "Labeled".dimmed(),
        "Astroturf".dimmed(),
    );
    for comp in &report.compositions {
        let label = if comp.cluster == NOISE_CLUSTER {
            "noise".yellow().to_string()
        } else {
            comp.cluster.to_string()
        };
        let frac = format!("{:.0}%", comp.astroturf_fraction() * 100.0);
        let frac = if comp.astroturf_fraction() >= 0.5 {
            frac.red().to_string()
        } else {
            frac.normal().to_string()
        };
        println!(
            "  {:>8}  {:>6}  {:>8}  {:>10}",
            label, comp.size, comp.labeled, frac
        );
    }
}
