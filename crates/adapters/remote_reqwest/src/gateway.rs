//! Gateway for the remote control and status functions.
//!
//! Base path: `{base_url}/functions/v1/`
//! Auth: `Authorization: Bearer <key>` and `apikey: <key>` when a key is set.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use bmshub_app::ports::RemoteGateway;
use bmshub_domain::action::DeviceAction;
use bmshub_domain::command::{CommandRequest, ControlResponse};
use bmshub_domain::error::GatewayError;
use bmshub_domain::status::{StatusRequest, SyncStatusResponse};

use crate::error::{ReqwestGatewayError, from_reqwest, from_status};

/// Settings for [`ReqwestGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Project URL, e.g. `https://project.example.co`.
    pub base_url: Url,
    /// Key sent as bearer token and `apikey` header.
    pub api_key: Option<String>,
    /// Deadline applied to each control request.
    pub request_timeout: Duration,
}

/// [`RemoteGateway`] over HTTP.
///
/// Status requests carry no client-side deadline of their own; the sync
/// scheduler bounds them.
pub struct ReqwestGateway {
    http: reqwest::Client,
    functions_url: Url,
    request_timeout: Duration,
}

impl ReqwestGateway {
    /// Build the gateway, injecting the auth headers as client defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ReqwestGatewayError`] if the key is not a valid header
    /// value, the base URL cannot carry a path, or the client fails to build.
    pub fn new(config: GatewayConfig) -> Result<Self, ReqwestGatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|key| !key.is_empty()) {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);

            let mut apikey = HeaderValue::from_str(key)?;
            apikey.set_sensitive(true);
            headers.insert("apikey", apikey);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            functions_url: functions_url(config.base_url)?,
            request_timeout: config.request_timeout,
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url, GatewayError> {
        self.functions_url
            .join(endpoint)
            .map_err(|err| GatewayError::Transport {
                message: format!("invalid endpoint {endpoint:?}: {err}"),
            })
    }

    async fn post<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + Sync,
    {
        let url = self.url(endpoint)?;
        tracing::debug!(%url, "POST");

        let mut request = self.http.post(url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let deadline = timeout.unwrap_or_default();

        let response = request
            .send()
            .await
            .map_err(|err| from_reqwest(&err, deadline))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| from_reqwest(&err, deadline))?;

        if !status.is_success() {
            return Err(from_status(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&text).map_err(|err| {
            let preview: String = text.chars().take(200).collect();
            GatewayError::Decode {
                message: format!("{err} (body preview: {preview:?})"),
            }
        })
    }
}

/// `https://host/prefix` becomes `https://host/prefix/functions/v1/`.
fn functions_url(mut base: Url) -> Result<Url, ReqwestGatewayError> {
    if base.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
    }
    let path = base.path().trim_end_matches('/').to_owned();
    base.set_path(&format!("{path}/functions/v1/"));
    Ok(base)
}

impl RemoteGateway for ReqwestGateway {
    async fn invoke_control<A: DeviceAction>(
        &self,
        endpoint: &'static str,
        request: &CommandRequest<A>,
    ) -> Result<ControlResponse, GatewayError> {
        self.post(endpoint, request, Some(self.request_timeout))
            .await
    }

    async fn fetch_status(
        &self,
        endpoint: &'static str,
        request: &StatusRequest,
    ) -> Result<SyncStatusResponse, GatewayError> {
        self.post(endpoint, request, None).await
    }
}
