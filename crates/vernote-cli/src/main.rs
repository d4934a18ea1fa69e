//! vernote CLI - capture, browse and sign off notes from the terminal

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use vernote_core::config::ClientConfig;
use vernote_core::Location;

use crate::cli::{Cli, Commands, VerifierCommands};
use crate::commands::add::run_add;
use crate::commands::attach_image::run_attach_image;
use crate::commands::completions::run_completions;
use crate::commands::list::{run_list, run_search};
use crate::commands::show::run_show;
use crate::commands::verifier::{run_verifier_add, run_verifier_list};
use crate::commands::verify::run_verify;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "vernote=info,vernote_core=warn";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().with_overrides(cli.api_url, cli.data_path);

    match cli.command {
        Some(Commands::Add {
            content,
            lat,
            long,
            image,
        }) => {
            let location = lat.zip(long).map(|(lat, long)| Location::new(lat, long));
            run_add(&content, location, image.as_deref(), &config).await?;
        }
        Some(Commands::List { query, utc, json }) => {
            run_list(query.as_deref(), utc, json, &config).await?;
        }
        Some(Commands::Search { query, utc, json }) => {
            run_search(&query, utc, json, &config).await?;
        }
        Some(Commands::Show { id, utc, json }) => run_show(&id, utc, json, &config).await?,
        Some(Commands::AttachImage { id, path }) => {
            run_attach_image(&id, &path, &config).await?;
        }
        Some(Commands::Verify {
            id,
            verifier,
            passcode,
        }) => run_verify(&id, &verifier, passcode, &config).await?,
        Some(Commands::Verifier { command }) => match command {
            VerifierCommands::Add { name, passcode } => {
                run_verifier_add(&name, passcode, &config).await?;
            }
            VerifierCommands::List { json } => run_verifier_list(json, &config).await?,
        },
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            // Quick capture mode: vernote "my note"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_add(&cli.note, None, None, &config).await?;
            }
        }
    }

    Ok(())
}
