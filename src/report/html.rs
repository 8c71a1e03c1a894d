use crate::report::report_model::{TestSuiteReport, seconds};
use crate::spec::spec_model::TestResult;

// ============================================================================
// HTML reporter
// ============================================================================

/// Self-contained HTML report with inline CSS.
///
/// One card per test: step/action/assertion counts, the fatal error if any,
/// and a table of every assertion with its actual value.
pub fn generate_html_report(report: &TestSuiteReport) -> String {
    let (header_color, status_text) = if report.all_passed() {
        ("#4CAF50", "ALL TESTS PASSED")
    } else {
        ("#f44336", "SOME TESTS FAILED")
    };

    let duration_text = report
        .duration_ms
        .map(|ms| format!(" in {}", seconds(ms)))
        .unwrap_or_default();

    let test_cases: String = report.test_results.iter().map(test_case).collect();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{suite_name}: form-harness report</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #f5f5f5; }}
.header {{ background: {header_color}; color: white; padding: 20px 30px; }}
.header h1 {{ margin: 0 0 8px 0; font-size: 24px; }}
.header p {{ margin: 0; font-size: 16px; opacity: 0.9; }}
.content {{ max-width: 960px; margin: 20px auto; padding: 0 20px; }}
.test-case {{ background: white; border-radius: 6px; padding: 16px 20px; margin-bottom: 12px; border-left: 4px solid #ccc; }}
.test-case.pass {{ border-left-color: #4CAF50; }}
.test-case.fail {{ border-left-color: #f44336; }}
.test-case h3 {{ margin: 0 0 8px 0; font-size: 16px; }}
.test-case p {{ margin: 4px 0; color: #666; font-size: 14px; }}
.test-case .error {{ color: #f44336; font-weight: bold; }}
table {{ border-collapse: collapse; width: 100%; margin-top: 8px; font-size: 13px; }}
td, th {{ text-align: left; padding: 4px 8px; border-bottom: 1px solid #eee; }}
tr.failed td {{ color: #c62828; }}
</style>
</head>
<body>
<div class="header">
<h1>{status_text}</h1>
<p>{suite_name}: {passed} passed, {failed} failed ({total} total, {actions} field actions){duration}</p>
</div>
<div class="content">
{test_cases}
</div>
</body>
</html>"##,
        suite_name = escape_html(&report.suite_name),
        header_color = header_color,
        status_text = status_text,
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        actions = report.total_actions(),
        duration = duration_text,
        test_cases = test_cases,
    )
}

fn test_case(result: &TestResult) -> String {
    let (class, marker) = if result.passed {
        ("pass", "\u{2713}")
    } else {
        ("fail", "\u{2717}")
    };

    let mut html = format!(
        "<div class=\"test-case {class}\">\n<h3>{marker} {name}</h3>\n<p>Steps: {steps} | Field actions: {actions} | Assertions: {assertions}</p>\n",
        class = class,
        marker = marker,
        name = escape_html(&result.spec_name),
        steps = result.steps_run,
        actions = result.actions_run,
        assertions = result.assertion_results.len(),
    );

    if let Some(error) = &result.error {
        html.push_str(&format!("<p class=\"error\">Error: {}</p>\n", escape_html(error)));
    }

    if !result.assertion_results.is_empty() {
        html.push_str("<table>\n<tr><th>Step</th><th>Check</th><th>Actual</th><th>Result</th></tr>\n");
        for ar in &result.assertion_results {
            let verdict = match (&ar.message, ar.passed) {
                (_, true) => "ok".to_string(),
                (Some(msg), false) => escape_html(msg),
                (None, false) => "failed".to_string(),
            };
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                if ar.passed { "passed" } else { "failed" },
                ar.step_index,
                ar.spec.kind(),
                escape_html(ar.actual.as_deref().unwrap_or("")),
                verdict
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</div>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
