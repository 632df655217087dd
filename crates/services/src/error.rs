//! Shared error types for the services crate.

use thiserror::Error;

use questionnaire_core::model::Capability;
use storage::StorageError;

/// Why the access guard rejected a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessDenied {
    #[error("login required")]
    NotLoggedIn,
    #[error("not enrolled in the course hosting this activity")]
    NotEnrolled,
    #[error("missing capability: {0}")]
    MissingCapability(Capability),
}

/// Errors emitted by `Renderer` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("template could not be compiled: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("template could not be rendered: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Errors emitted while handling a page request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PageError {
    #[error("access denied: {0}")]
    AccessDenied(#[from] AccessDenied),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("side-channel data could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StorageError> for PageError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => PageError::NotFound("record"),
            other => PageError::Storage(other),
        }
    }
}

impl PageError {
    /// Map a storage lookup failure, naming what was missing.
    pub(crate) fn lookup(what: &'static str) -> impl FnOnce(StorageError) -> PageError {
        move |err| match err {
            StorageError::NotFound => PageError::NotFound(what),
            other => PageError::Storage(other),
        }
    }
}
