//! Create/fetch/delete decision for a single service account.
//!
//! Each call is a one-shot transition over `(intent, exists)`:
//!
//! | intent  | exists | action | outcome           |
//! |---------|--------|--------|-------------------|
//! | Present | no     | create | `Created`         |
//! | Present | yes    | none   | `Unchanged(found)`|
//! | Absent  | yes    | delete | `Deleted`         |
//! | Absent  | no     | none   | `AlreadyAbsent`   |
//!
//! A fetch failure other than 404 aborts before any mutating call. Existing
//! accounts are never updated: attribute drift is not detected.

use std::fmt;

use tracing::instrument;

use crate::accessor::ServiceAccountApi;
use crate::descriptor::{ReconcileIntent, RemoteState, ResourceDescriptor, ServiceAccount};
use crate::error::{ReconcileError, Result};
use crate::transport::Credential;

/// What a reconcile call would do given the observed remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Create,
    Delete,
    None,
}

impl PlannedAction {
    /// Pure decision table.
    pub fn decide(intent: ReconcileIntent, remote: &RemoteState) -> Self {
        match (intent, remote.exists()) {
            (ReconcileIntent::Present, false) => Self::Create,
            (ReconcileIntent::Absent, true) => Self::Delete,
            (ReconcileIntent::Present, true) | (ReconcileIntent::Absent, false) => Self::None,
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
            Self::None => write!(f, "none"),
        }
    }
}

/// What a reconcile call did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Created,
    Deleted,
    /// Present and already there; carries the fetched attributes.
    Unchanged(ServiceAccount),
    AlreadyAbsent,
}

impl ReconcileOutcome {
    /// Whether a mutating call was issued.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Created | Self::Deleted)
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Deleted => write!(f, "deleted"),
            Self::Unchanged(_) => write!(f, "unchanged"),
            Self::AlreadyAbsent => write!(f, "absent"),
        }
    }
}

/// One entry of a batch.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub descriptor: ResourceDescriptor,
    pub intent: ReconcileIntent,
    pub credential: Credential,
}

/// Result of [`Reconciler::reconcile_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(label, outcome)` for every entry handled before any failure.
    pub completed: Vec<(String, ReconcileOutcome)>,
    /// The label and error that stopped the batch.
    pub failure: Option<(String, ReconcileError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    api: ServiceAccountApi,
}

impl Reconciler {
    pub fn new(api: ServiceAccountApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ServiceAccountApi {
        &self.api
    }

    /// Fetch the remote object and report what [`reconcile`](Self::reconcile)
    /// would do, without mutating anything.
    pub async fn plan(
        &self,
        descriptor: &ResourceDescriptor,
        intent: ReconcileIntent,
        credential: &Credential,
    ) -> Result<(PlannedAction, RemoteState)> {
        let remote = self.observe(descriptor, credential).await?;
        Ok((PlannedAction::decide(intent, &remote), remote))
    }

    /// Drive the remote account towards `intent`, issuing at most one
    /// mutating call.
    #[instrument(
        skip_all,
        fields(label = descriptor.label(), project = descriptor.project(), intent = %intent)
    )]
    pub async fn reconcile(
        &self,
        descriptor: &ResourceDescriptor,
        intent: ReconcileIntent,
        credential: &Credential,
    ) -> Result<ReconcileOutcome> {
        let name = descriptor.remote_name();
        let remote = self.observe(descriptor, credential).await?;
        let action = PlannedAction::decide(intent, &remote);
        tracing::info!(remote_name = name, %action, "reconciling service account");

        match (action, remote) {
            (PlannedAction::Create, _) => {
                let collection = self.api.collection_url(descriptor.project())?;
                self.api
                    .create(&collection, &descriptor.create_request(), credential)
                    .await
                    .map_err(|e| {
                        tracing::warn!(remote_name = name, error = %e, "create failed");
                        ReconcileError::create_failed(name, e)
                    })?;
                Ok(ReconcileOutcome::Created)
            }
            (PlannedAction::Delete, _) => {
                let item = self.api.item_url(descriptor.project(), name)?;
                self.api.delete(&item, credential).await.map_err(|e| {
                    tracing::warn!(remote_name = name, error = %e, "delete failed");
                    ReconcileError::delete_failed(name, e)
                })?;
                Ok(ReconcileOutcome::Deleted)
            }
            (PlannedAction::None, RemoteState::Found(account)) => {
                Ok(ReconcileOutcome::Unchanged(account))
            }
            (PlannedAction::None, RemoteState::NotFound) => Ok(ReconcileOutcome::AlreadyAbsent),
        }
    }

    /// Reconcile entries in order, stopping at the first failure.
    pub async fn reconcile_all(&self, requests: &[ReconcileRequest]) -> BatchReport {
        let mut report = BatchReport::default();
        for req in requests {
            let label = req.descriptor.label().to_string();
            match self.reconcile(&req.descriptor, req.intent, &req.credential).await {
                Ok(outcome) => report.completed.push((label, outcome)),
                Err(err) => {
                    report.failure = Some((label, err));
                    break;
                }
            }
        }
        report
    }

    async fn observe(
        &self,
        descriptor: &ResourceDescriptor,
        credential: &Credential,
    ) -> Result<RemoteState> {
        let name = descriptor.remote_name();
        let item = self.api.item_url(descriptor.project(), name)?;
        self.api.fetch(&item, credential).await.map_err(|e| {
            tracing::warn!(remote_name = name, error = %e, "fetch failed");
            ReconcileError::fetch_failed(name, e)
        })
    }
}
