//! Supabase client over the PostgREST HTTP interface.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, Url};
use serde::Deserialize;

use super::backend::{TableBackend, TableRequest};
use super::query::Predicate;
use super::Record;
use crate::errors::{AppError, AppResult};

const REST_PATH: &str = "rest/v1/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// URL and API key of a Supabase project.
#[derive(Clone)]
pub struct ServiceCredentials {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("url", &self.url)
            .field("key", &"***")
            .finish()
    }
}

/// Error body returned by PostgREST. Bodies without `message` are not PostgREST errors.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Connection handle for a Supabase project.
pub struct SupabaseClient {
    rest_url: Url,
    key: String,
    http: reqwest::Client,
}

impl SupabaseClient {
    /// Creates a client for the project described by `credentials`.
    pub fn new(credentials: &ServiceCredentials) -> AppResult<Self> {
        let base = Url::parse(credentials.url.trim()).map_err(|e| {
            AppError::Configuration(format!("invalid Supabase URL {:?}: {}", credentials.url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "invalid Supabase URL {:?}",
                credentials.url
            )));
        }

        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join(REST_PATH).map_err(|e| {
            AppError::Configuration(format!("invalid Supabase URL {:?}: {}", credentials.url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            rest_url,
            key: credentials.key.clone(),
            http,
        })
    }

    /// Endpoint for `table`, percent-encoded as a single path segment.
    pub fn table_url(&self, table: &str) -> AppResult<Url> {
        let mut url = self.rest_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Supabase REST URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(table);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }
}

fn predicate_pairs(predicates: &[Predicate]) -> Vec<(String, String)> {
    predicates.iter().map(Predicate::to_query_pair).collect()
}

#[async_trait]
impl TableBackend for SupabaseClient {
    async fn execute(&self, request: TableRequest) -> AppResult<Vec<Record>> {
        let url = self.table_url(request.table())?;

        let builder = match &request {
            TableRequest::Select { query, .. } => self
                .request(Method::GET, url)
                .query(&query.to_query_pairs()),
            TableRequest::Insert { rows, .. } => self
                .request(Method::POST, url)
                .header("Prefer", "return=representation")
                .json(rows),
            TableRequest::Update {
                predicates, values, ..
            } => self
                .request(Method::PATCH, url)
                .header("Prefer", "return=representation")
                .query(&predicate_pairs(predicates))
                .json(values),
            TableRequest::Delete { predicates, .. } => self
                .request(Method::DELETE, url)
                .header("Prefer", "return=representation")
                .query(&predicate_pairs(predicates)),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                table = request.table(),
                operation = request.operation(),
                status = status.as_u16(),
                "Supabase request failed"
            );
            return Err(upstream_error(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body).map_err(|e| AppError::ExternalService {
            status: Some(status.as_u16()),
            code: None,
            message: format!("unexpected Supabase response: {}", e),
        })
    }
}

/// Builds the error for a non-2xx reply, keeping PostgREST's message and code.
fn upstream_error(status: u16, body: &str) -> AppError {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => {
            let mut message = err.message;
            if let Some(details) = err.details.filter(|d| !d.is_empty()) {
                message = format!("{} ({})", message, details);
            }
            if let Some(hint) = err.hint.filter(|h| !h.is_empty()) {
                message = format!("{}; hint: {}", message, hint);
            }
            AppError::ExternalService {
                status: Some(status),
                code: err.code,
                message,
            }
        }
        Err(_) => AppError::ExternalService {
            status: Some(status),
            code: None,
            message: if body.trim().is_empty() {
                format!("Supabase returned HTTP {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}
