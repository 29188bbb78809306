//! TOML manifest of service accounts.
//!
//! ```toml
//! [[service_account]]
//! label = "title0"
//! display_name = "test display_name#0 data"
//! project = "test project#0 data"
//! action = "create"
//! credential = "mycred"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use giam_core::{ReconcileRequest, ResourceAttributes};
use serde::Deserialize;

use crate::config::CredentialResolver;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(rename = "service_account", default)]
    pub service_accounts: Vec<ResourceAttributes>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate every entry and attach its credential. Labels must be unique.
    pub fn into_requests(self, credentials: &CredentialResolver) -> Result<Vec<ReconcileRequest>> {
        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(self.service_accounts.len());

        for (index, attrs) in self.service_accounts.into_iter().enumerate() {
            let entry = attrs.label.clone().unwrap_or_else(|| format!("#{}", index + 1));
            let credential_name = attrs.credential.clone();
            let (descriptor, intent) = attrs
                .into_descriptor()
                .with_context(|| format!("service_account {entry}"))?;
            let credential = credentials
                .resolve(credential_name.as_deref())
                .with_context(|| format!("service_account {entry}"))?;

            if !seen.insert(descriptor.label().to_string()) {
                anyhow::bail!("Duplicate service_account label: {}", descriptor.label());
            }
            requests.push(ReconcileRequest {
                descriptor,
                intent,
                credential,
            });
        }
        Ok(requests)
    }
}
