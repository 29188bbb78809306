use anyhow::{Context, Result};
use colored::Colorize;
use giam_core::{RemoteState, ServiceAccountApi};

use crate::cli::OutputFormat;
use crate::config::CredentialResolver;
use crate::output::print_account;

pub async fn get(
    api: &ServiceAccountApi,
    project: &str,
    name: &str,
    credential: Option<&str>,
    credentials: &CredentialResolver,
    format: OutputFormat,
) -> Result<()> {
    let credential = credentials.resolve(credential)?;
    let item = api.item_url(project, name)?;
    let state = api
        .fetch(&item, &credential)
        .await
        .with_context(|| format!("Failed to fetch {item}"))?;

    match state {
        RemoteState::Found(account) => print_account(&account, format),
        RemoteState::NotFound => {
            anyhow::bail!("Service account {} not found in project {}", name.cyan(), project.cyan())
        }
    }
    Ok(())
}
