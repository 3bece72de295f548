//! Human-readable end-of-run summary.

use casemover_engine::{Status, Summary};
use std::fmt::Write;

/// Renders `summary` as an indented block, one line per non-zero status.
pub fn render_summary(summary: &Summary) -> String {
    let plan = &summary.plan;
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = writeln!(out, "Run summary ({} outcomes):", summary.total());
    let _ = writeln!(
        out,
        "  Identifiers: {} (matched {}, not found {}, multiple matches {})",
        plan.identifiers, plan.matched, plan.not_found, plan.multiple
    );
    let _ = writeln!(out, "  Folders scanned: {}", summary.folders_scanned);
    if summary.scan_errors > 0 {
        let _ = writeln!(out, "  Unreadable folders skipped: {}", summary.scan_errors);
    }
    for status in Status::ALL {
        let count = summary.count(status);
        if count > 0 {
            let _ = writeln!(out, "  {status}: {count}");
        }
    }
    if plan.limit_reached() {
        let _ = writeln!(out, "  Operation cap reached; {} pairs not evaluated", plan.unevaluated);
    }
    if summary.cancelled {
        let _ = writeln!(out, "  Interrupted: not every planned decision was recorded");
    }
    out
}
