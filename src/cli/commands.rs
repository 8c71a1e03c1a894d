use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::actions::phone::{format_phone_number, template_for};
use crate::browser::driver::PageDriver;
use crate::browser::session::BrowserSession;
use crate::cli::config::{Settings, preflight};
use crate::error::HarnessError;
use crate::fixture::FixtureData;
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scenario::application::{self, ResumeTokens, SCENARIOS, ScenarioParams};
use crate::spec::runner::TestRunner;
use crate::spec::spec_model::TestSpec;
use crate::trace::logger::TraceLogger;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// run subcommand
// ============================================================================

/// Run YAML specs and return whether all passed.
pub fn cmd_run(settings: &Settings, spec_path: &str) -> CmdResult<bool> {
    let specs = load_specs(spec_path)?;
    if specs.is_empty() {
        warn!(path = spec_path, "no test specs found");
        return Ok(true);
    }
    if settings.preflight {
        if let Some(base) = &settings.base_url {
            preflight(base)?;
        }
    }
    execute(settings, "run", &specs)
}

// ============================================================================
// scenario subcommand
// ============================================================================

pub fn cmd_scenario(
    settings: &Settings,
    name: &str,
    resume: Option<&str>,
    document: Option<&Path>,
) -> CmdResult<bool> {
    let base_url = settings.base_url.clone().ok_or_else(|| {
        HarnessError::Config("a base URL is required (--base-url, BASE_URL or target.base_url)".into())
    })?;

    let mut params = ScenarioParams::new(&base_url).with_adults(settings.num_adults);
    params.resume = resume.map(ResumeTokens::parse).transpose()?;
    params.document = document.map(Path::to_path_buf);
    let spec = application::build(name, &params)?;

    if settings.preflight {
        preflight(&base_url)?;
    }
    execute(settings, name, &[spec])
}

// ============================================================================
// list / phone subcommands
// ============================================================================

pub fn cmd_list() {
    for (name, about) in SCENARIOS {
        println!("{:<18} {}", name, about);
    }
}

pub fn cmd_phone(country: &str, digits: &str) {
    let code = country.trim_start_matches('+');
    match template_for(code) {
        Some(t) => println!("+{} {} ({})", code, format_phone_number(code, digits), t.country),
        None => println!("+{} {} (no mask known)", code, format_phone_number(code, digits)),
    }
}

// ============================================================================
// Shared execution
// ============================================================================

/// Run specs in one browser session, then report.
fn execute(settings: &Settings, suite: &str, specs: &[TestSpec]) -> CmdResult<bool> {
    let fixtures = FixtureData::new();
    let trace = match &settings.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    info!(run_id = %fixtures.run_id(), specs = specs.len(), "starting run");

    let mut runner = TestRunner::new(settings.actions.clone());
    if let Some(base) = &settings.base_url {
        runner = runner.with_base_url(base);
    }

    let mut session = BrowserSession::launch(&settings.browser)?;
    let start = Instant::now();
    let results: Vec<_> = specs
        .iter()
        .map(|spec| runner.run(spec, &mut session, &fixtures, &trace))
        .collect();
    let duration = start.elapsed().as_millis();
    debug!(url = session.last_url().unwrap_or("-"), "closing browser session");
    if let Err(e) = session.quit() {
        warn!(error = %e, "failed to close browser session");
    }

    let report = TestSuiteReport::from_results(suite, results).with_duration(duration);
    write_report(&report, &settings.format, settings.output.as_deref())?;
    Ok(report.all_passed())
}

pub fn write_report(report: &TestSuiteReport, format: &str, output: Option<&str>) -> CmdResult<()> {
    let content = match format {
        "html" => generate_html_report(report),
        "junit" => generate_junit_xml(report),
        "console" => format_console_report(report),
        other => {
            return Err(HarnessError::Config(format!(
                "unknown report format '{}' (console, html, junit)",
                other
            ))
            .into());
        }
    };
    match output {
        Some(path) => std::fs::write(path, &content)?,
        None => print!("{}", content),
    }
    Ok(())
}

/// Load test specs from a single YAML file or a directory of YAML files.
pub fn load_specs(path: &str) -> CmdResult<Vec<TestSpec>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_dir() {
        let mut specs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
                let content = std::fs::read_to_string(&p)?;
                let spec: TestSpec = serde_yaml::from_str(&content)?;
                specs.push(spec);
            }
        }
        // Sort by name for deterministic order
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    } else {
        let content = std::fs::read_to_string(path)?;
        Ok(vec![serde_yaml::from_str(&content)?])
    }
}
