use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use m73_post::cli::{self, Cli, CliError, Commands};
use m73_post::post::PostError;
use m73_post::report;

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Annotate {
            input,
            output,
            settings,
            disable,
            on_missing,
        } => {
            let settings = cli::resolve_settings(settings.as_deref(), disable)?;
            let result = cli::annotate_file(&input, output.as_deref(), settings, on_missing.into());

            if let Err(CliError::Post(PostError::Annotate(err))) = &result {
                eprint!("{}", report::render(err, std::io::stderr().is_terminal()));
            }
            result
        }
        Commands::Definition => {
            println!("{}", cli::definition_json()?);
            Ok(())
        }
    }
}
