//! HTTP client for the StoreScore REST API.
//!
//! Every request is scoped to one organization via the `X-Organization`
//! header and, when a token is configured, authenticated with a bearer token.
//! Reads are retried on transient failures; mutations are sent exactly once
//! and tagged with an `X-Request-Id` for log correlation.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use storescore_core::{AppConfig, OrgId};

use crate::error::{extract_detail, ClientError};
use crate::retry::retry_with_backoff;
use crate::types::ListResponse;

pub(crate) const ORG_HEADER: &str = "X-Organization";
pub(crate) const REQUEST_ID_HEADER: &str = "X-Request-Id";
const JSON: &str = "application/json";

/// Upper bound on followed `next` links for one list call.
pub(crate) const MAX_PAGES: usize = 100;

/// Client for the StoreScore REST API, bound to a single organization.
///
/// Use [`StoreScoreClient::from_config`] in the binary or
/// [`StoreScoreClient::with_base_url`] to point at a mock server in tests.
pub struct StoreScoreClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    org_id: OrgId,
    api_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl StoreScoreClient {
    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if the API URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let client = Self::build(
            &config.api_url,
            config.org_id,
            config.api_token.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        Ok(client.with_retry_policy(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Creates a client with a custom base URL and no retries (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        org_id: OrgId,
        api_token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        Self::build(
            base_url,
            org_id,
            api_token,
            timeout_secs,
            "storescore/0.1 (region-manager)",
        )
    }

    fn build(
        base_url: &str,
        org_id: OrgId,
        api_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so relative joins append to the path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            org_id,
            api_token: api_token.map(str::to_owned),
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Retry policy for reads. Mutations are never retried.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Resolve a path relative to the base URL (`"stores/3/"`).
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    fn request(&self, method: Method, url: Url, accept: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header(ORG_HEADER, self.org_id.to_string())
            .header(reqwest::header::ACCEPT, accept);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Fetch every page of a list endpoint, following `next` links.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] / [`ClientError::Http`] after retries are exhausted.
    /// - [`ClientError::Deserialize`] if a page does not match `T`.
    /// - [`ClientError::PaginationLimit`] after [`MAX_PAGES`] pages.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClientError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        let first_url = url.to_string();

        let mut items = Vec::new();
        for _ in 0..MAX_PAGES {
            let body = self.get_text(&url).await?;
            let page: ListResponse<T> = parse_body(&body, url.as_str())?;
            let (mut page_items, next) = page.into_parts();
            items.append(&mut page_items);

            match next {
                Some(next) => {
                    url = Url::parse(&next).or_else(|_| self.endpoint(&next))?;
                }
                None => return Ok(items),
            }
        }

        Err(ClientError::PaginationLimit {
            url: first_url,
            max_pages: MAX_PAGES,
        })
    }

    /// GET raw bytes (images), with retries.
    pub(crate) async fn get_bytes(&self, path: &str, accept: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(path)?;
        let accept = accept.to_owned();
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            let accept = accept.clone();
            async move {
                tracing::debug!(%url, "GET (bytes)");
                let response = self.request(Method::GET, url, &accept).send().await?;
                let response = check_status(response).await?;
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }

    async fn get_text(&self, url: &Url) -> Result<String, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                tracing::debug!(%url, "GET");
                let response = self
                    .request(Method::GET, url, JSON)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok(response.text().await?)
            }
        })
        .await
    }

    /// Send a mutation exactly once and return the raw response body.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ClientError> {
        let url = self.endpoint(path)?;
        let request_id = uuid::Uuid::new_v4();
        tracing::debug!(%method, %url, %request_id, "sending mutation");

        let mut request = self
            .request(method, url, JSON)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }

    /// Send a mutation and decode its JSON response.
    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let context = format!("{method} {path}");
        let text = self.send(method, path, body).await?;
        parse_body(&text, &context)
    }
}

/// Pass 2xx responses through; turn anything else into [`ClientError::Api`]
/// carrying the backend's detail message when there is one.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        url,
        detail: extract_detail(&body),
    })
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
