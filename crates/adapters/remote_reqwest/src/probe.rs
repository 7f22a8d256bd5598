//! SmartThings credential probe.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use bmshub_app::ports::PlatformProbe;
use bmshub_domain::error::{BmsError, CredentialError, GatewayError};
use bmshub_domain::platform_config::{AccessToken, Location};

use crate::error::{ReqwestGatewayError, from_reqwest, from_status};

#[derive(Deserialize)]
struct LocationsPage {
    #[serde(default)]
    items: Vec<LocationItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationItem {
    location_id: String,
    #[serde(default)]
    name: String,
}

/// [`PlatformProbe`] calling `GET {api}/v1/locations` with the token as bearer.
pub struct SmartThingsProbe {
    http: reqwest::Client,
    locations_url: Url,
    timeout: Duration,
}

impl SmartThingsProbe {
    /// # Errors
    ///
    /// Returns [`ReqwestGatewayError`] if `api_base_url` cannot be extended
    /// with `v1/locations` or the client fails to build.
    pub fn new(api_base_url: &Url, timeout: Duration) -> Result<Self, ReqwestGatewayError> {
        let mut base = api_base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            locations_url: base.join("v1/locations")?,
            timeout,
        })
    }
}

impl PlatformProbe for SmartThingsProbe {
    async fn list_locations(&self, token: &AccessToken) -> Result<Vec<Location>, BmsError> {
        tracing::debug!(url = %self.locations_url, "GET");
        let response = self
            .http
            .get(self.locations_url.clone())
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|err| from_reqwest(&err, self.timeout))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(%status, "platform rejected access token");
            return Err(CredentialError::Rejected.into());
        }
        let text = response
            .text()
            .await
            .map_err(|err| from_reqwest(&err, self.timeout))?;
        if !status.is_success() {
            return Err(from_status(status, &text).into());
        }

        let page: LocationsPage =
            serde_json::from_str(&text).map_err(|err| GatewayError::Decode {
                message: err.to_string(),
            })?;
        Ok(page
            .items
            .into_iter()
            .map(|item| Location {
                location_id: item.location_id,
                name: item.name,
            })
            .collect())
    }
}
