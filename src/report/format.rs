//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the normalization code stays free of presentation concerns
//! - output changes are localized

use crate::app::pipeline::{MergeOutput, SourceRun};
use crate::domain::{CANONICAL_COLUMNS, CanonicalTable};

/// Summary of a single-source run.
pub fn format_source_summary(run: &SourceRun) -> String {
    let mut out = String::new();

    out.push_str("=== cprep - canonical credit-risk table ===\n");
    out.push_str(&format!("Source: {} ({})\n", run.report.source, run.path.display()));
    out.push_str(&format_source_block(run));
    out.push('\n');
    out.push_str(&format_table_stats(&run.table));

    out
}

/// Summary of a merge run: one block per source, then the merged totals.
pub fn format_merge_summary(output: &MergeOutput) -> String {
    let mut out = String::new();

    out.push_str("=== cprep - merged canonical table ===\n");
    for run in &output.runs {
        out.push_str(&format!("\n[{}] {}\n", run.report.source, run.path.display()));
        out.push_str(&format_source_block(run));
    }
    out.push_str("\nMerged:\n");
    out.push_str(&format_table_stats(&output.merged));

    out
}

fn format_source_block(run: &SourceRun) -> String {
    let r = &run.report;
    let mut out = String::new();

    out.push_str(&format!(
        "Rows: in={} | out={} | dropped={} | capped={}\n",
        r.rows_in,
        r.rows_out,
        r.dropped.total(),
        r.capped_out
    ));
    if r.dropped.total() > 0 {
        out.push_str(&format!(
            "  dropped: missing={} non-finite={} label-out-of-range={}\n",
            r.dropped.missing_value, r.dropped.non_finite, r.dropped.label_out_of_range
        ));
    }
    if run.unreadable_records > 0 {
        out.push_str(&format!("  unreadable CSV records skipped: {}\n", run.unreadable_records));
    }
    if let Some(label) = &r.label_column {
        out.push_str(&format!("Label column: {label:?}\n"));
    }
    if let Some(n) = r.bill_columns {
        out.push_str(&format!("BILL_AMT columns: {n}\n"));
    }
    if !r.unmapped_statuses.is_empty() {
        out.push_str("Unrecognized loan_status values (mapped to 0):\n");
        for (status, count) in &r.unmapped_statuses {
            out.push_str(&format!("  {count:>8}  {status}\n"));
        }
    }

    out
}

fn format_table_stats(table: &CanonicalTable) -> String {
    let mut out = String::new();

    out.push_str(&format!("Columns: {}\n", CANONICAL_COLUMNS.join(", ")));
    out.push_str(&format!("Rows: {}", table.len()));
    match table.default_rate() {
        Some(rate) => out.push_str(&format!(" | default rate={:.2}%\n", rate * 100.0)),
        None => out.push('\n'),
    }

    if table.is_empty() {
        return out;
    }

    out.push_str(&format!("{:<22} {:>14} {:>14} {:>14}\n", "feature", "min", "mean", "max").trim_end());
    out.push('\n');
    let matrix = table.feature_matrix();
    for (j, name) in CANONICAL_COLUMNS.iter().take(4).enumerate() {
        let (min, mean, max) = column_stats(matrix.iter().map(|row| row[j]));
        out.push_str(&format!("{name:<22} {min:>14.2} {mean:>14.2} {max:>14.2}\n"));
    }

    out
}

fn column_stats(values: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        n += 1;
    }
    let mean = if n == 0 { f64::NAN } else { sum / n as f64 };
    (min, mean, max)
}
