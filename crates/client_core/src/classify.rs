//! Maps transport and protocol failures onto the closed `FailureKind` taxonomy.

use reqwest::StatusCode;
use shared::error::{CatalogFailure, FailureKind};

/// Low-level description of why a remote call failed, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFailure {
    Timeout,
    Connect(String),
    /// I/O failure while sending the request or reading the body.
    Io(String),
    Status(u16),
    Decode(String),
    InvalidRequest(String),
    Other(String),
}

impl RawFailure {
    fn detail(&self) -> String {
        match self {
            RawFailure::Timeout => "request timed out".to_string(),
            RawFailure::Connect(detail) => format!("connect failed: {detail}"),
            RawFailure::Io(detail) => format!("transport i/o failed: {detail}"),
            RawFailure::Status(code) => format!("remote answered HTTP {code}"),
            RawFailure::Decode(detail) => format!("malformed payload: {detail}"),
            RawFailure::InvalidRequest(detail) => format!("invalid request: {detail}"),
            RawFailure::Other(detail) => detail.clone(),
        }
    }
}

pub fn classify(raw: &RawFailure) -> FailureKind {
    match raw {
        RawFailure::Timeout | RawFailure::Connect(_) | RawFailure::Io(_) => FailureKind::Network,
        RawFailure::Status(code) => classify_status(*code),
        RawFailure::Decode(_) | RawFailure::InvalidRequest(_) | RawFailure::Other(_) => {
            FailureKind::Unexpected
        }
    }
}

pub fn classify_status(code: u16) -> FailureKind {
    match StatusCode::from_u16(code) {
        Ok(StatusCode::NOT_FOUND) => FailureKind::NotFound,
        Ok(status) if status.is_server_error() => FailureKind::Server,
        _ => FailureKind::Unexpected,
    }
}

impl From<&reqwest::Error> for RawFailure {
    fn from(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            RawFailure::Timeout
        } else if err.is_connect() {
            RawFailure::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            RawFailure::Status(status.as_u16())
        } else if err.is_decode() {
            RawFailure::Decode(err.to_string())
        } else if err.is_builder() {
            RawFailure::InvalidRequest(err.to_string())
        } else if err.is_request() || err.is_body() {
            RawFailure::Io(err.to_string())
        } else {
            RawFailure::Other(err.to_string())
        }
    }
}

impl From<RawFailure> for CatalogFailure {
    fn from(raw: RawFailure) -> Self {
        let failure = CatalogFailure::new(classify(&raw), raw.detail());
        match raw {
            RawFailure::Status(code) => failure.with_status(code),
            _ => failure,
        }
    }
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
