//! Content store API client implementation.
//!
//! Uses `reqwest` for HTTP and `serde_json` for bodies.
//! Caches catalog reads using `moka` (5-minute TTL).

mod cache;
mod catalog;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::SanityConfig;
use crate::sanity::types::{AssetResponse, MutateResponse, QueryResponse, UploadedAsset};
use crate::sanity::{SanityError, describe_error_body};

use cache::{CacheKey, CacheValue};

// =============================================================================
// SanityClient
// =============================================================================

/// Client for the content store's HTTP API.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct SanityClient {
    inner: Arc<SanityClientInner>,
}

struct SanityClientInner {
    client: reqwest::Client,
    /// `{api_base_url}/v{api_version}/`
    versioned_base: Url,
    dataset: String,
    read_token: Option<SecretString>,
    write_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

/// Which token a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

impl SanityClient {
    /// Create a new content store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &SanityConfig) -> Result<Self, SanityError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let versioned_base = Url::parse(&format!(
            "{}/v{}/",
            config.api_base_url.trim_end_matches('/'),
            config.api_version.trim_start_matches('v')
        ))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("fashionable-queen-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(SanityClientInner {
                client,
                versioned_base,
                dataset: config.dataset.clone(),
                read_token: config.read_token.clone(),
                write_token: config.write_token.clone(),
                cache,
            }),
        })
    }

    /// Whether mutations and uploads can be attempted.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.inner.write_token.is_some()
    }

    /// Build `{versioned_base}{section}/{dataset}`.
    fn endpoint(&self, section: &str) -> Result<Url, SanityError> {
        Ok(self
            .inner
            .versioned_base
            .join(&format!("{section}/{}", self.inner.dataset))?)
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        access: Access,
    ) -> Result<reqwest::RequestBuilder, SanityError> {
        let token = match access {
            Access::Read => self.inner.read_token.as_ref(),
            Access::Write => Some(
                self.inner
                    .write_token
                    .as_ref()
                    .ok_or(SanityError::MissingWriteToken)?,
            ),
        };
        Ok(match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        })
    }

    /// Send a request and decode a JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SanityError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SanityError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Content store returned non-success status"
            );
            return Err(SanityError::Api {
                status: status.as_u16(),
                message: describe_error_body(&response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse content store response"
            );
            SanityError::Parse(e)
        })
    }

    /// Run a GROQ query with named parameters.
    ///
    /// Parameter names are given without the `$`; values are JSON-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the result does not decode as `T`.
    #[instrument(skip(self, params), fields(query_len = groq.len()))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<T, SanityError> {
        let mut url = self.endpoint("data/query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &serde_json::to_string(value)?);
            }
        }

        let request = self.authorize(self.inner.client.get(url), Access::Read)?;
        let response: QueryResponse<T> = self.execute(request).await?;
        Ok(response.result)
    }

    /// Create a document and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if no write token is configured, the mutation is
    /// rejected, or the API returns no document.
    #[instrument(skip(self, document))]
    pub async fn create<D: Serialize, T: DeserializeOwned>(
        &self,
        document: &D,
    ) -> Result<T, SanityError> {
        let mut url = self.endpoint("data/mutate")?;
        url.query_pairs_mut()
            .append_pair("returnDocuments", "true")
            .append_pair("visibility", "sync");

        let body = serde_json::json!({ "mutations": [{ "create": document }] });
        let request = self.authorize(self.inner.client.post(url).json(&body), Access::Write)?;

        let response: MutateResponse<T> = self.execute(request).await?;
        response
            .results
            .into_iter()
            .find_map(|result| result.document)
            .ok_or(SanityError::EmptyMutation)
    }

    /// Upload an image asset.
    ///
    /// # Errors
    ///
    /// Returns an error if no write token is configured or the upload fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedAsset, SanityError> {
        let mut url = self.endpoint("assets/images")?;
        url.query_pairs_mut().append_pair("filename", filename);

        let request = self.authorize(
            self.inner
                .client
                .post(url)
                .header(CONTENT_TYPE, content_type)
                .body(bytes),
            Access::Write,
        )?;

        let response: AssetResponse = self.execute(request).await?;
        tracing::debug!(asset_id = %response.document.id, "Uploaded image asset");
        Ok(response.document)
    }

    /// Cheap round trip used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot be reached.
    pub async fn ping(&self) -> Result<(), SanityError> {
        self.query::<serde_json::Value>(queries::PING, &[]).await?;
        Ok(())
    }

    /// Drop every cached catalog read.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }
}
