//! CSV Output
//!
//! Flat per-outcome rows for spreadsheet analysis. Optional fields render as
//! empty cells, never as zero.

use crate::report::Report;

fn fmt_opt_f64(v: Option<f64>) -> String {
    v.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

fn fmt_opt_u64(v: Option<u64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Generate a CSV rendition of the per-variant results.
pub fn generate_csv_report(report: &Report) -> String {
    let mut out = String::from(
        "backend,variant,tx,ty,tz,success,query_ms,total_query_ms,inside_count,total_points,wall_time_s,failure\n",
    );

    for (backend, outcomes) in &report.results {
        for outcome in outcomes {
            let failure = outcome
                .failure
                .as_ref()
                .map(|f| format!("{}: {}", f.kind, f.message.replace([',', '\n'], " ")))
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{:.3},{}\n",
                backend,
                outcome.index.label(),
                outcome.translation[0],
                outcome.translation[1],
                outcome.translation[2],
                outcome.success,
                fmt_opt_f64(outcome.query_ms),
                fmt_opt_f64(outcome.total_query_ms),
                fmt_opt_u64(outcome.inside_count),
                fmt_opt_u64(outcome.total_points),
                outcome.wall_time_s,
                failure,
            ));
        }
    }

    out
}
