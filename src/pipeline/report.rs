use crate::pipeline::train::TrainingSummary;
use crate::stats::format_confusion;
use std::fmt::Write;

/// Renders the human-readable summary printed at the end of a training run.
pub fn generate_report(summary: &TrainingSummary) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Counts before balancing -> {}", summary.counts_before_balance);
    let _ = writeln!(out, "Label counts after balancing -> {}", summary.counts_after_balance);
    let _ = writeln!(
        out,
        "Balanced rows: {}",
        summary.counts_after_balance.total()
    );
    let _ = writeln!(
        out,
        "Feature matrix shape: ({}, {})",
        summary.matrix_shape.0, summary.matrix_shape.1
    );
    let _ = writeln!(
        out,
        "Train/test rows: {} / {}",
        summary.train_rows, summary.test_rows
    );
    let convergence = if summary.converged {
        "converged"
    } else {
        "stopped at iteration cap"
    };
    let _ = writeln!(
        out,
        "Solver: {} after {} iterations",
        convergence, summary.iterations
    );

    let _ = writeln!(out, "\nAccuracy: {:.4}\n", summary.report.accuracy);
    let _ = writeln!(out, "Classification report:");
    let _ = writeln!(out, "{}", summary.report);
    let _ = writeln!(out, "Confusion matrix:");
    let _ = writeln!(out, "{}", format_confusion(&summary.report.confusion));

    let _ = writeln!(
        out,
        "\nSaved {} and {}",
        summary.model_path.display(),
        summary.vectorizer_path.display()
    );

    let _ = writeln!(out, "\nQuick sanity predictions (1=coding,0=non-coding):");
    for prediction in &summary.sanity {
        let label = prediction
            .label
            .map_or_else(|| "n/a".to_string(), |l| format!("{} ({})", l, l.meaning()));
        let preview: String = prediction.sequence.chars().take(30).collect();
        let _ = writeln!(out, "  {:<16} {}... -> {}", prediction.name, preview, label);
    }
    let _ = write!(out, "\nFinished in {:.2}s", summary.elapsed_seconds);

    out
}
