//! Corvus CLI - search and explore machine-learning model artefacts.

use std::io::IsTerminal;
use std::process;

use clap::Parser;
use corvus::cli::{Cli, Commands, SetCommands};
use corvus::commands::{self, ListArgs, ListOutcome};
use corvus::config::CorvusConfig;
use corvus::config::{ProcessEnv, resolve_config};
use corvus::search::open_searcher;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "CORVUS_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for tables and JSON.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_command(command: Commands) -> Result<(), corvus::Error> {
    let env = ProcessEnv;

    match command {
        Commands::Set { command } => match command {
            SetCommands::Format { output_format } => {
                let config = CorvusConfig::load()?;
                let result = commands::set_format(config, output_format, &env)?;
                println!("{}", result.to_human());
            }
            SetCommands::ApiKey { api_key } => {
                let config = CorvusConfig::load()?;
                let api_key = match api_key {
                    Some(key) => key,
                    None => commands::prompt_api_key()?,
                };
                let result = commands::set_api_key(config, &api_key, &env)?;
                if result.api_key.is_some() {
                    println!("{}", result.to_human());
                }
            }
        },

        Commands::List(cmd) => {
            let config = CorvusConfig::load()?;
            let args: ListArgs = cmd.into();
            match commands::list(&config, &args, &env, open_searcher)? {
                ListOutcome::Models(listing) => println!("{}", listing.render()?.trim_end()),
                ListOutcome::MissingApiKey => eprintln!("{}", commands::MISSING_API_KEY_MESSAGE),
            }
        }

        Commands::Show => {
            let resolved = resolve_config()?;
            let report = commands::show_config(&resolved);
            println!("{}", report.render(resolved.output_format.value));
        }
    }

    Ok(())
}
