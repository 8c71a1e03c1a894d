use crate::report::report_model::{TestSuiteReport, seconds};

// ============================================================================
// Console reporter
// ============================================================================

/// Format a suite report for the terminal.
///
/// ```text
/// === form-harness: application-form ===
///
/// ✓ PASS  homepage (1 steps, 0 actions, 4 assertions)
/// ✗ FAIL  application-form (3 steps, 41 actions, 0 assertions)
///     [ERROR] Step 2 failed: option 'single' not found in dropdown 'Civil status'
///
/// === Results: 1 passed, 1 failed (2 total, 1 errored) in 48.2s ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = format!("=== form-harness: {} ===\n\n", report.suite_name);

    for result in &report.test_results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        out.push_str(&format!(
            "{}  {} ({} steps, {} actions, {} assertions)\n",
            marker,
            result.spec_name,
            result.steps_run,
            result.actions_run,
            result.assertion_results.len()
        ));

        if let Some(error) = &result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }
        for ar in result.assertion_results.iter().filter(|ar| !ar.passed) {
            let detail = ar.message.as_deref().unwrap_or("assertion failed");
            out.push_str(&format!("    [FAIL] Step {}: {}: {}", ar.step_index, ar.spec.kind(), detail));
            if let Some(actual) = &ar.actual {
                out.push_str(&format!(" (actual: {})", actual));
            }
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total",
        report.passed, report.failed, report.total
    ));
    if report.errored > 0 {
        out.push_str(&format!(", {} errored", report.errored));
    }
    out.push(')');
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {}", seconds(ms)));
    }
    out.push_str(" ===\n");
    out
}
