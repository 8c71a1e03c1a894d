use clap::Parser;
use form_harness::cli::commands::{cmd_list, cmd_phone, cmd_run, cmd_scenario};
use form_harness::cli::config::{Cli, Commands, Settings, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &config);

    let all_passed = match &cli.command {
        Commands::Run { spec, .. } => cmd_run(&settings, spec)?,
        Commands::Scenario {
            name,
            resume,
            document,
            ..
        } => cmd_scenario(&settings, name, resume.as_deref(), document.as_deref())?,
        Commands::List => {
            cmd_list();
            true
        }
        Commands::Phone { country, digits } => {
            cmd_phone(country, digits);
            true
        }
    };

    if !all_passed {
        std::process::exit(1);
    }
    Ok(())
}
