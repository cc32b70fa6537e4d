use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connectivity problems and timeouts.
    Network,
    /// The remote side reports no such resource.
    NotFound,
    /// The remote side failed while handling the request.
    Server,
    Unexpected,
}

impl FailureKind {
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::Network => "Connection error. Check your internet connection.",
            FailureKind::NotFound => "The requested country could not be found.",
            FailureKind::Server => "The country service is unavailable right now. Try again later.",
            FailureKind::Unexpected => "Something went wrong while loading countries.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {detail}")]
pub struct CatalogFailure {
    pub kind: FailureKind,
    pub detail: String,
    /// HTTP status that produced this failure, if any.
    pub status: Option<u16>,
}

impl CatalogFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == FailureKind::NotFound
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}
