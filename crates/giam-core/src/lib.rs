//! Idempotent reconciliation of IAM service accounts over the provider REST API.
//!
//! The crate is layered leaves first: [`template`] expands URL path templates,
//! [`accessor`] performs GET/POST/DELETE through an injected
//! [`HttpTransport`], and [`reconciler`] decides between create, delete and
//! no-op for one [`ResourceDescriptor`].

pub mod accessor;
pub mod descriptor;
pub mod error;
pub mod reconciler;
pub mod template;
pub mod transport;

#[cfg(test)]
mod testing;

pub use accessor::{DEFAULT_BASE_URL, ServiceAccountApi};
pub use descriptor::{
    CreateRequest, ReconcileIntent, RemoteState, ResourceAttributes, ResourceDescriptor,
    ServiceAccount,
};
pub use error::{
    DescriptorError, ErrorCategory, LocatorError, ReconcileError, Result, TemplateError,
    TransportError,
};
pub use reconciler::{BatchReport, PlannedAction, ReconcileOutcome, ReconcileRequest, Reconciler};
pub use template::{TemplateVars, expand, expand_with_extra};
pub use transport::{Credential, HttpResponse, HttpTransport, ReqwestTransport};
