use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actions::ActionConfig;
use crate::browser::session::BrowserOptions;
use crate::error::{HarnessError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "form-harness.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-harness",
    version,
    about = "Browser automation harness for multi-step rental application forms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-harness.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Base URL of the tenant under test
    #[arg(long, env = "BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Browser adapter script
    #[arg(long, env = "FORM_HARNESS_BROWSER_SERVER", global = true)]
    pub browser_server: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Skip the reachability check before launching a browser
    #[arg(long, global = true)]
    pub no_preflight: bool,

    /// Pick the first dropdown option when the requested one is missing
    #[arg(long, global = true)]
    pub lenient: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run test specs from YAML files
    Run {
        /// Path to test spec YAML file or directory of YAML files
        #[arg(long)]
        spec: String,

        /// Output format: console, html, junit
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a built-in scenario against the base URL
    Scenario {
        /// Scenario name (see `list`)
        name: String,

        /// Household members to add
        #[arg(long, env = "NUM_ADULTS")]
        adults: Option<usize>,

        /// Continue an application: token1/token2/uuid
        #[arg(long)]
        resume: Option<String>,

        /// File used for optional document uploads
        #[arg(long)]
        document: Option<PathBuf>,

        /// Output format: console, html, junit
        #[arg(long)]
        format: Option<String>,

        #[arg(short, long)]
        output: Option<String>,
    },

    /// List built-in scenarios
    List,

    /// Print a phone number as the form's country mask would render it
    Phone {
        /// Dial code, with or without '+'
        #[arg(long)]
        country: String,

        #[arg(long)]
        digits: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-harness.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub base_url: Option<String>,
    pub num_adults: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub server_script: Option<PathBuf>,
    pub headless: Option<bool>,
    pub slow_mo_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    pub strict_options: Option<bool>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,
    pub output: Option<String>,
    /// JSONL action trace; off when absent
    pub trace: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
            trace: None,
        }
    }
}

fn default_console() -> String {
    "console".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load the config file. A missing file yields defaults; a malformed one is an error.
pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let explicit = path.is_some();
    let config_path = Path::new(path.unwrap_or(DEFAULT_CONFIG_FILE));
    match std::fs::read_to_string(config_path) {
        Ok(content) => {
            debug!(path = %config_path.display(), "loaded config file");
            Ok(serde_yaml::from_str(&content)?)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => Ok(AppConfig::default()),
        Err(e) => Err(HarnessError::Config(format!(
            "cannot read {}: {}",
            config_path.display(),
            e
        ))),
    }
}

// ============================================================================
// Settings (CLI > env > file > defaults)
// ============================================================================

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: Option<String>,
    pub num_adults: usize,
    pub browser: BrowserOptions,
    pub actions: ActionConfig,
    pub format: String,
    pub output: Option<String>,
    pub trace: Option<PathBuf>,
    pub preflight: bool,
}

impl Settings {
    /// Merge parsed arguments over the config file. Environment variables
    /// arrive through clap's `env` fallbacks and so rank between the two.
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Settings {
        let defaults = BrowserOptions::default();
        let browser = BrowserOptions {
            server_script: cli
                .browser_server
                .clone()
                .or_else(|| config.browser.server_script.clone())
                .unwrap_or(defaults.server_script),
            headless: !cli.headed && config.browser.headless.unwrap_or(defaults.headless),
            slow_mo_ms: config.browser.slow_mo_ms.unwrap_or(defaults.slow_mo_ms),
        };

        let mut actions = ActionConfig::default();
        if let Some(strict) = config.actions.strict_options {
            actions.strict_options = strict;
        }
        if cli.lenient {
            actions.strict_options = false;
        }
        if let Some(ms) = config.actions.timeout_ms {
            actions.timeout_ms = ms;
        }

        let (format, output, adults) = match &cli.command {
            Commands::Run { format, output, .. } => (format.clone(), output.clone(), None),
            Commands::Scenario {
                format,
                output,
                adults,
                ..
            } => (format.clone(), output.clone(), *adults),
            Commands::List | Commands::Phone { .. } => (None, None, None),
        };

        Settings {
            base_url: cli.base_url.clone().or_else(|| config.target.base_url.clone()),
            num_adults: adults.or(config.target.num_adults).unwrap_or(1),
            browser,
            actions,
            format: format.unwrap_or_else(|| config.run.format.clone()),
            output: output.or_else(|| config.run.output.clone()),
            trace: config.run.trace.clone(),
            preflight: !cli.no_preflight,
        }
    }
}

// ============================================================================
// Preflight
// ============================================================================

/// GET `url` and fail on transport errors or a 5xx status.
pub fn preflight(url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| HarnessError::Preflight {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().map_err(|e| HarnessError::Preflight {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if status.is_server_error() {
        return Err(HarnessError::Preflight {
            url: url.to_string(),
            reason: format!("server answered {}", status),
        });
    }
    info!(%url, %status, "target reachable");
    Ok(())
}
