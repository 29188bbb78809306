mod cli;
mod commands;
mod config;
mod logging;
mod manifest;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use giam_core::{Reconciler, ReqwestTransport, ServiceAccountApi};

use cli::{Cli, Commands, OutputFormat};
use config::{ConfigStore, CredentialResolver};
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = ConfigStore::default_location()?;
    let profile_name = &cli.profile;
    let profile = store.load_profile(profile_name)?;

    match &cli.command {
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile_name);
                println!(
                    "{}: {}",
                    "Base URL".cyan(),
                    config::resolve_base_url(cli.base_url.as_deref(), &profile)
                );
                println!(
                    "{}: {}",
                    "Credential".cyan(),
                    profile.credential.as_deref().unwrap_or(config::DEFAULT_CREDENTIAL)
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile.format.as_deref().unwrap_or("table")
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = profile.clone();
                cfg.set(&set_args.key, &set_args.value)?;
                store.save_profile(profile_name, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Apply(args) => {
            let api = make_api(cli.base_url.as_deref(), &profile)?;
            let credentials = make_credentials(&cli, &store, &profile)?;
            let format = resolve_format(cli.format, &profile)?;
            commands::apply::apply(
                &Reconciler::new(api),
                &args.manifest,
                &credentials,
                args.dry_run,
                format,
            )
            .await?;
        }
        Commands::Get(args) => {
            let api = make_api(cli.base_url.as_deref(), &profile)?;
            let credentials = make_credentials(&cli, &store, &profile)?;
            let format = resolve_format(cli.format, &profile)?;
            commands::get::get(
                &api,
                &args.project,
                &args.name,
                args.credential.as_deref(),
                &credentials,
                format,
            )
            .await?;
        }
    }

    Ok(())
}

/// `--format` wins over the profile's `format`.
fn resolve_format(
    cli_format: Option<OutputFormat>,
    profile: &config::ProfileConfig,
) -> Result<OutputFormat> {
    use clap::ValueEnum;

    match (cli_format, profile.format.as_deref()) {
        (Some(format), _) => Ok(format),
        (None, None) => Ok(OutputFormat::default()),
        (None, Some(v)) => <OutputFormat as ValueEnum>::from_str(v, true)
            .map_err(|e| anyhow::anyhow!("Invalid format '{v}' in config: {e}")),
    }
}

fn make_api(base_url: Option<&str>, profile: &config::ProfileConfig) -> Result<ServiceAccountApi> {
    let base_url = config::resolve_base_url(base_url, profile);
    tracing::debug!(%base_url, "using API endpoint");
    ServiceAccountApi::with_base_url(Arc::new(ReqwestTransport::new()), &base_url)
        .with_context(|| format!("Invalid base URL: {base_url}"))
}

fn make_credentials(
    cli: &Cli,
    store: &ConfigStore,
    profile: &config::ProfileConfig,
) -> Result<CredentialResolver> {
    let stored = if cli.token.is_some() {
        Default::default()
    } else {
        store.load_credentials()?
    };
    Ok(CredentialResolver::new(cli.token.clone(), profile, stored))
}
