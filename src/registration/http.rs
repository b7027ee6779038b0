// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP registration server client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::{Error, ParseError, ProtocolError};
use crate::registration::{RegistrationServer, ServerRegistrationId};
use crate::subscription::PushSubscription;

// ============================================================================
// RegistrationConfig - Connection parameters for the registration server
// ============================================================================

/// Configuration for a registration server reached over HTTP.
///
/// # Examples
///
/// ```
/// use webpush_lib::registration::RegistrationConfig;
/// use std::time::Duration;
///
/// let config = RegistrationConfig::new("https://push.example.com/api/")
///     .with_timeout(Duration::from_secs(5))
///     .with_header("x-client", "web");
///
/// assert_eq!(config.base_url(), "https://push.example.com/api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    base_url: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl RegistrationConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the server at `base_url`.
    ///
    /// A scheme-less address is treated as plain HTTP. Trailing slashes are
    /// removed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{base_url}")
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the extra headers.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Creates an `HttpRegistrationClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a header is invalid or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpRegistrationClient, ProtocolError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProtocolError::InvalidAddress(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProtocolError::InvalidAddress(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpRegistrationClient {
            base_url: self.base_url,
            timeout: self.timeout,
            client,
        })
    }
}

// ============================================================================
// HttpRegistrationClient - JSON over HTTP
// ============================================================================

/// Body returned by `POST /subscription`.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: Option<ServerRegistrationId>,
}

/// HTTP client for a push registration server.
///
/// - `POST {base}/subscription` with the subscription as JSON, answered by
///   `{"id": ...}`
/// - `GET {base}/subscription/{id}`, answered with a success status when the
///   id is known
///
/// # Examples
///
/// ```no_run
/// use webpush_lib::registration::{HttpRegistrationClient, RegistrationServer};
/// use webpush_lib::ServerRegistrationId;
///
/// # async fn example() -> webpush_lib::Result<()> {
/// let client = HttpRegistrationClient::new("https://push.example.com")?;
/// let id = ServerRegistrationId::new("srv-42")?;
/// client.fetch_status(&id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpRegistrationClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpRegistrationClient {
    /// Creates a client for the server at `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProtocolError> {
        RegistrationConfig::new(base_url).into_client()
    }

    /// Returns the base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the subscription collection.
    fn collection_url(&self) -> String {
        format!("{}/subscription", self.base_url)
    }

    /// URL of a single stored subscription.
    fn item_url(&self, id: &ServerRegistrationId) -> String {
        format!(
            "{}/subscription/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            ProtocolError::Timeout(millis)
        } else {
            ProtocolError::Http(err)
        }
    }

    fn ensure_success(response: &Response) -> Result<(), ProtocolError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(ProtocolError::Rejected {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}

impl RegistrationServer for HttpRegistrationClient {
    async fn submit(&self, subscription: &PushSubscription) -> Result<ServerRegistrationId, Error> {
        let url = self.collection_url();

        tracing::debug!(url = %url, endpoint = %subscription.endpoint, "Submitting push subscription");

        let response = self
            .client
            .post(&url)
            .json(subscription)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        Self::ensure_success(&response)?;

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        tracing::debug!(body = %body, "Received registration response");

        let parsed: SubmitResponse = serde_json::from_str(&body).map_err(ParseError::Json)?;
        parsed
            .id
            .ok_or_else(|| ParseError::MissingField("id".to_string()).into())
    }

    async fn fetch_status(&self, id: &ServerRegistrationId) -> Result<(), Error> {
        let url = self.item_url(id);

        tracing::debug!(url = %url, "Fetching registration status");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        Self::ensure_success(&response)?;
        Ok(())
    }
}
