use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use giam_core::Reconciler;

use crate::cli::OutputFormat;
use crate::config::CredentialResolver;
use crate::manifest::Manifest;
use crate::output::{print_outcomes, print_plan, print_success};

pub async fn apply(
    reconciler: &Reconciler,
    manifest: &Path,
    credentials: &CredentialResolver,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let requests = Manifest::load(manifest)?.into_requests(credentials)?;
    tracing::info!(count = requests.len(), manifest = %manifest.display(), "loaded manifest");

    if dry_run {
        let mut plan = Vec::with_capacity(requests.len());
        for req in &requests {
            let (action, _) = reconciler
                .plan(&req.descriptor, req.intent, &req.credential)
                .await
                .with_context(|| format!("service_account {}", req.descriptor.label()))?;
            plan.push((req.descriptor.label().to_string(), action));
        }
        print_plan(&plan, format);
        return Ok(());
    }

    let report = reconciler.reconcile_all(&requests).await;
    print_outcomes(&report.completed, format);

    if let Some((label, err)) = report.failure {
        return Err(anyhow::Error::new(err).context(format!("service_account {label}")));
    }
    if matches!(format, OutputFormat::Table) {
        print_success(&format!(
            "Applied {}",
            manifest.display().to_string().cyan()
        ));
    }
    Ok(())
}
