//! Desired and observed state of a service account.
//!
//! [`ResourceAttributes`] is the loosely-typed attribute bag handed over by a
//! declarative front end. It is validated once, at the boundary, into a
//! [`ResourceDescriptor`] plus a [`ReconcileIntent`]; nothing deeper in the
//! crate re-checks required fields.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accessor::is_dot_segment;
use crate::error::DescriptorError;

/// Whether the resource should exist after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileIntent {
    #[default]
    Present,
    Absent,
}

impl FromStr for ReconcileIntent {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" | "create" => Ok(Self::Present),
            "absent" | "delete" => Ok(Self::Absent),
            other => Err(DescriptorError::InvalidIntent(other.to_string())),
        }
    }
}

impl fmt::Display for ReconcileIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Desired state of one service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    label: String,
    display_name: Option<String>,
    project: String,
    remote_name: Option<String>,
}

impl ResourceDescriptor {
    /// Build a descriptor, rejecting an empty `label` or `project` and either
    /// one being a `.`/`..` path segment.
    pub fn new(label: impl Into<String>, project: impl Into<String>) -> Result<Self, DescriptorError> {
        let label = label.into();
        let project = project.into();
        if label.trim().is_empty() {
            return Err(DescriptorError::EmptyField("label"));
        }
        if project.trim().is_empty() {
            return Err(DescriptorError::EmptyField("project"));
        }
        if is_dot_segment(&label) {
            return Err(DescriptorError::DotSegment("label"));
        }
        if is_dot_segment(&project) {
            return Err(DescriptorError::DotSegment("project"));
        }
        Ok(Self {
            label,
            display_name: None,
            project,
            remote_name: None,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Override the remote name. An empty override is ignored so that
    /// [`remote_name`](Self::remote_name) never resolves to an empty string.
    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        let remote_name = remote_name.into();
        self.remote_name = (!remote_name.trim().is_empty()).then_some(remote_name);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Name used on the remote side; falls back to the label.
    pub fn remote_name(&self) -> &str {
        self.remote_name.as_deref().unwrap_or(&self.label)
    }

    /// Body sent when creating the account. `project` only ever goes in the URL.
    pub fn create_request(&self) -> CreateRequest<'_> {
        CreateRequest {
            name: self.remote_name(),
            display_name: self.display_name(),
        }
    }
}

/// JSON body of a create call.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CreateRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
}

/// Attribute bag as written in a manifest.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResourceAttributes {
    pub label: Option<String>,
    pub display_name: Option<String>,
    pub project: Option<String>,
    /// Remote name override.
    #[serde(alias = "name")]
    pub sa_label: Option<String>,
    /// Action verb; defaults to `create`.
    pub action: Option<String>,
    /// Name of the credential used for this resource.
    pub credential: Option<String>,
}

impl ResourceAttributes {
    /// Validate the bag into a typed descriptor and intent.
    pub fn into_descriptor(self) -> Result<(ResourceDescriptor, ReconcileIntent), DescriptorError> {
        let label = self.label.ok_or(DescriptorError::MissingField("label"))?;
        let project = self.project.ok_or(DescriptorError::MissingField("project"))?;
        let intent = match self.action.as_deref() {
            Some(action) => action.parse()?,
            None => ReconcileIntent::Present,
        };

        let mut descriptor = ResourceDescriptor::new(label, project)?;
        if let Some(display_name) = self.display_name {
            descriptor = descriptor.with_display_name(display_name);
        }
        if let Some(name) = self.sa_label {
            if is_dot_segment(&name) {
                return Err(DescriptorError::DotSegment("sa_label"));
            }
            descriptor = descriptor.with_remote_name(name);
        }
        Ok((descriptor, intent))
    }
}

/// A service account as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth2_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Fields this crate does not model.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Result of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteState {
    Found(ServiceAccount),
    NotFound,
}

impl RemoteState {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
