//! Remote catalog access: the `CountrySource` seam and its HTTP adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::Country,
    error::{CatalogFailure, FailureKind},
    protocol::{
        normalize_countries, normalize_country, CountryPayload, OneOrMany, DETAIL_FIELDS,
        LIST_FIELDS,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::classify::RawFailure;

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog operations consumed by the controllers. Implementations classify
/// every failure before returning it and sort list results by display name.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Country>, CatalogFailure>;
    async fn fetch_by_code(&self, code: &str) -> Result<Country, CatalogFailure>;
    async fn search_by_name(&self, query: &str) -> Result<Vec<Country>, CatalogFailure>;
}

#[derive(Debug, Error)]
pub enum SourceSetupError {
    #[error("invalid catalog base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("catalog base url '{0}' cannot carry path segments")]
    OpaqueBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub struct RestCountriesSource {
    http: Client,
    base_url: Url,
}

impl RestCountriesSource {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, SourceSetupError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, SourceSetupError> {
        let base_url = Url::parse(base_url).map_err(|source| SourceSetupError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SourceSetupError::OpaqueBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], fields: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.query_pairs_mut().append_pair("fields", fields);
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogFailure> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| log_failure(&url, RawFailure::from(&err).into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(log_failure(&url, RawFailure::Status(status.as_u16()).into()));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| log_failure(&url, RawFailure::from(&err).into()))
    }
}

#[async_trait]
impl CountrySource for RestCountriesSource {
    async fn fetch_all(&self) -> Result<Vec<Country>, CatalogFailure> {
        let url = self.endpoint(&["all"], LIST_FIELDS);
        let payloads: Vec<CountryPayload> = self.get_json(url).await?;
        let countries = normalize_countries(payloads);
        debug!(count = countries.len(), "catalog: listing fetched");
        Ok(countries)
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Country, CatalogFailure> {
        let code = require_non_blank(code, "country code")?;
        let url = self.endpoint(&["alpha", code], DETAIL_FIELDS);
        let payload: OneOrMany = self.get_json(url).await?;
        let Some(payload) = payload.into_first() else {
            return Err(CatalogFailure::new(
                FailureKind::NotFound,
                format!("no country with code {code}"),
            ));
        };
        debug!(code, "catalog: country fetched");
        Ok(normalize_country(payload))
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<Country>, CatalogFailure> {
        let query = require_non_blank(query, "search query")?;
        let url = self.endpoint(&["name", query], LIST_FIELDS);
        let payloads: Vec<CountryPayload> = self.get_json(url).await?;
        let countries = normalize_countries(payloads);
        debug!(query, count = countries.len(), "catalog: search completed");
        Ok(countries)
    }
}

fn require_non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str, CatalogFailure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogFailure::new(
            FailureKind::Unexpected,
            format!("{what} must not be blank"),
        ));
    }
    Ok(trimmed)
}

fn log_failure(url: &Url, failure: CatalogFailure) -> CatalogFailure {
    warn!(
        url = %url,
        kind = ?failure.kind,
        status = failure.status,
        detail = %failure.detail,
        "catalog: request failed"
    );
    failure
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
