use crate::report::report_model::TestSuiteReport;
use crate::spec::spec_model::TestResult;

const CLASSNAME: &str = "form-harness";

// ============================================================================
// JUnit XML reporter
// ============================================================================

/// JUnit XML for CI. A fatal step error becomes `<error>`, failed
/// assertions become `<failure>`; a test can carry both.
///
/// ```xml
/// <testsuite name="scenarios" tests="2" failures="1" errors="1" time="12.500">
///   <testcase name="homepage" classname="form-harness" />
///   <testcase name="application-form" classname="form-harness">
///     <error message="Step 2 failed: ..." type="StepError" />
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let cases: String = report.test_results.iter().map(testcase).collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed.saturating_sub(report.errored),
        errors = report.errored,
        time = time_attr,
        cases = cases,
    )
}

fn testcase(result: &TestResult) -> String {
    let name = escape_xml(&result.spec_name);
    if result.passed {
        return format!("  <testcase name=\"{}\" classname=\"{}\" />\n", name, CLASSNAME);
    }

    let mut body = String::new();
    if let Some(error) = &result.error {
        body.push_str(&format!(
            "    <error message=\"{}\" type=\"StepError\" />\n",
            escape_xml(error)
        ));
    }

    let failed: Vec<String> = result
        .assertion_results
        .iter()
        .filter(|ar| !ar.passed)
        .map(|ar| {
            let msg = ar.message.as_deref().unwrap_or("assertion failed");
            format!("Step {}: {}: {}", ar.step_index, ar.spec.kind(), msg)
        })
        .collect();
    if !failed.is_empty() {
        body.push_str(&format!(
            "    <failure message=\"{} assertion(s) failed\" type=\"AssertionFailure\">{}</failure>\n",
            failed.len(),
            escape_xml(&failed.join("\n"))
        ));
    }

    format!(
        "  <testcase name=\"{}\" classname=\"{}\">\n{}  </testcase>\n",
        name, CLASSNAME, body
    )
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
