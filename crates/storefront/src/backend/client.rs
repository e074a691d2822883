//! Low-level REST client for the hosted backend.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::BackendError;

/// Which bearer token authorizes a request.
#[derive(Clone, Copy)]
pub enum Bearer<'a> {
    /// The project API key (anonymous role, public catalog reads).
    ApiKey,
    /// A signed-in user's access token, or the service key for operator tools.
    Token(&'a SecretString),
}

/// A PostgREST row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column=eq.value`
    Eq(&'static str, String),
    /// `column=in.(a,b,c)`
    In(&'static str, Vec<String>),
}

impl Filter {
    /// Match rows whose `column` equals `value`.
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self::Eq(column, value.to_string())
    }

    /// Match rows whose `column` is any of `values`.
    pub fn any_of<T: ToString>(column: &'static str, values: impl IntoIterator<Item = T>) -> Self {
        Self::In(column, values.into_iter().map(|v| v.to_string()).collect())
    }

    fn to_query_pair(&self) -> (&'static str, String) {
        match self {
            Self::Eq(column, value) => (column, format!("eq.{value}")),
            Self::In(column, values) => (column, format!("in.({})", values.join(","))),
        }
    }
}

/// Client for the hosted backend's REST interface.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: Url,
    api_key: SecretString,
}

/// Error body returned by PostgREST.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl BackendClient {
    /// Create a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if `base_url` is not a valid URL.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, BackendError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join("rest/v1/")?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                rest_url,
                api_key,
            }),
        })
    }

    /// Select rows from `table`.
    ///
    /// `columns` is a PostgREST `select` list and may embed related tables,
    /// e.g. `id,quantity,products(id,name)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects it, or the
    /// response cannot be decoded as `T`.
    #[instrument(skip(self, filters, bearer), fields(table = %table))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
        bearer: Bearer<'_>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, Some(columns), filters)?;
        let body = self.send(self.request(Method::GET, url, bearer)).await?;

        let rows: Vec<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })?;

        debug!(rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    /// Insert one row (or an array of rows) into `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, body, bearer), fields(table = %table))]
    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        bearer: Bearer<'_>,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, None, &[])?;
        let request = self
            .request(Method::POST, url, bearer)
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(request).await?;
        Ok(())
    }

    /// Patch the rows of `table` matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, filters, body, bearer), fields(table = %table))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filters: &[Filter],
        body: &B,
        bearer: Bearer<'_>,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, None, filters)?;
        let request = self
            .request(Method::PATCH, url, bearer)
            .header("Prefer", "return=minimal")
            .json(body);
        self.send(request).await?;
        Ok(())
    }

    /// Delete the rows of `table` matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, filters, bearer), fields(table = %table))]
    pub async fn delete(
        &self,
        table: &str,
        filters: &[Filter],
        bearer: Bearer<'_>,
    ) -> Result<(), BackendError> {
        let url = self.table_url(table, None, filters)?;
        let request = self
            .request(Method::DELETE, url, bearer)
            .header("Prefer", "return=minimal");
        self.send(request).await?;
        Ok(())
    }

    fn table_url(
        &self,
        table: &str,
        columns: Option<&str>,
        filters: &[Filter],
    ) -> Result<Url, BackendError> {
        let mut url = self.inner.rest_url.join(table)?;

        if columns.is_some() || !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = columns {
                pairs.append_pair("select", columns);
            }
            for filter in filters {
                let (column, value) = filter.to_query_pair();
                pairs.append_pair(column, &value);
            }
        }

        Ok(url)
    }

    fn request(&self, method: Method, url: Url, bearer: Bearer<'_>) -> RequestBuilder {
        let token = match bearer {
            Bearer::ApiKey => self.inner.api_key.expose_secret(),
            Bearer::Token(token) => token.expose_secret(),
        };

        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.api_key.expose_secret())
            .bearer_auth(token)
    }

    /// Send a request and return the response body of a successful call.
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(api_error(status, &body));
        }

        Ok(body)
    }
}

fn api_error(status: StatusCode, body: &str) -> BackendError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = match (parsed.message, parsed.details) {
                (Some(message), Some(details)) => format!("{message} ({details})"),
                (Some(message), None) => message,
                (None, Some(details)) => details,
                (None, None) => String::new(),
            };
            (parsed.code, message)
        }
        Err(_) => (None, body.chars().take(200).collect()),
    };

    BackendError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
