use std::path::PathBuf;

use clap::Parser;
use form_harness::cli::config::{AppConfig, Cli, Commands, Settings, load_config};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["form-harness"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

/// Parsed arguments with environment fallbacks cleared.
fn parse_without_env(args: &[&str]) -> Cli {
    let mut cli = parse(args);
    if !args.contains(&"--base-url") {
        cli.base_url = None;
    }
    if !args.contains(&"--browser-server") {
        cli.browser_server = None;
    }
    if let Commands::Scenario { adults, .. } = &mut cli.command {
        if !args.contains(&"--adults") {
            *adults = None;
        }
    }
    cli
}

const CONFIG_YAML: &str = r#"
target:
  base_url: https://from-file.example
  num_adults: 3
browser:
  headless: true
  slow_mo_ms: 50
actions:
  strict_options: false
  timeout_ms: 9000
run:
  format: junit
  trace: trace.jsonl
"#;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn parse_run_with_format_and_output() {
    let cli = parse(&["run", "--spec", "specs/", "--format", "html", "-o", "report.html"]);
    match cli.command {
        Commands::Run { spec, format, output } => {
            assert_eq!(spec, "specs/");
            assert_eq!(format.as_deref(), Some("html"));
            assert_eq!(output.as_deref(), Some("report.html"));
        }
        other => panic!("expected Run, got {:?}", other),
    }
}

#[test]
fn parse_scenario_with_globals_after_subcommand() {
    let cli = parse(&["scenario", "application-form", "--adults", "2", "--resume", "a/b/c", "-vv", "--headed"]);
    assert_eq!(cli.verbose, 2);
    assert!(cli.headed);
    match cli.command {
        Commands::Scenario { name, adults, resume, .. } => {
            assert_eq!(name, "application-form");
            assert_eq!(adults, Some(2));
            assert_eq!(resume.as_deref(), Some("a/b/c"));
        }
        other => panic!("expected Scenario, got {:?}", other),
    }
}

#[test]
fn parse_phone_and_list() {
    let cli = parse(&["phone", "--country", "+41", "--digits", "791234567"]);
    assert!(matches!(cli.command, Commands::Phone { ref country, .. } if country == "+41"));
    assert!(matches!(parse(&["list"]).command, Commands::List));
}

// ============================================================================
// Config file
// ============================================================================

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form-harness.yaml");
    assert!(load_config(Some(path.to_str().unwrap())).is_err());
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "target: [not, a, map").unwrap();
    assert!(load_config(Some(path.to_str().unwrap())).is_err());
}

#[test]
fn config_file_fills_unset_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form-harness.yaml");
    std::fs::write(&path, CONFIG_YAML).unwrap();
    let config = load_config(Some(path.to_str().unwrap())).unwrap();

    let settings = Settings::resolve(&parse_without_env(&["scenario", "homepage"]), &config);
    assert_eq!(settings.base_url.as_deref(), Some("https://from-file.example"));
    assert_eq!(settings.num_adults, 3);
    assert_eq!(settings.format, "junit");
    assert_eq!(settings.trace, Some(PathBuf::from("trace.jsonl")));
    assert_eq!(settings.browser.slow_mo_ms, 50);
    assert!(!settings.actions.strict_options);
    assert_eq!(settings.actions.timeout_ms, 9000);
    assert!(settings.preflight);
}

#[test]
fn command_line_overrides_config_file() {
    let config: AppConfig = serde_yaml::from_str(CONFIG_YAML).unwrap();
    let cli = parse_without_env(&[
        "--base-url",
        "https://cli.example",
        "--headed",
        "--no-preflight",
        "scenario",
        "homepage",
        "--adults",
        "1",
        "--format",
        "console",
    ]);

    let settings = Settings::resolve(&cli, &config);
    assert_eq!(settings.base_url.as_deref(), Some("https://cli.example"));
    assert_eq!(settings.num_adults, 1);
    assert_eq!(settings.format, "console");
    assert!(!settings.browser.headless);
    assert!(!settings.preflight);
}

#[test]
fn defaults_without_file_or_flags() {
    let settings = Settings::resolve(&parse_without_env(&["list"]), &AppConfig::default());
    assert_eq!(settings.base_url, None);
    assert_eq!(settings.num_adults, 1);
    assert_eq!(settings.format, "console");
    assert!(settings.browser.headless);
    assert!(settings.actions.strict_options);
    assert_eq!(settings.browser.server_script, PathBuf::from("node/browser_server.js"));
}

#[test]
fn lenient_flag_relaxes_dropdowns() {
    let cli = parse_without_env(&["--lenient", "list"]);
    assert!(!Settings::resolve(&cli, &AppConfig::default()).actions.strict_options);
}
