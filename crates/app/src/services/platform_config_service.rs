//! Platform config service: validate and persist the platform credential.

use bmshub_domain::error::{BmsError, NotFoundError};
use bmshub_domain::platform_config::{AccessToken, Location, PlatformConfig};

use crate::ports::{PlatformConfigRepository, PlatformProbe};

/// Application service behind the platform-config endpoint.
pub struct PlatformConfigService<P, R> {
    probe: P,
    repo: R,
}

impl<P: PlatformProbe, R: PlatformConfigRepository> PlatformConfigService<P, R> {
    pub fn new(probe: P, repo: R) -> Self {
        Self { probe, repo }
    }

    /// Check `token` against the platform without persisting anything.
    ///
    /// # Errors
    ///
    /// Returns [`BmsError::Validation`] for a blank token,
    /// [`BmsError::Credential`] when the platform rejects it, or the
    /// probe's gateway error.
    #[tracing::instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Vec<Location>, BmsError> {
        let token = AccessToken::new(token)?;
        let locations = self.probe.list_locations(&token).await?;
        tracing::info!(locations = locations.len(), "platform credential validated");
        Ok(locations)
    }

    /// Validate `token`, then make it the active configuration.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate), plus storage errors from the
    /// repository. Nothing is written when validation fails.
    #[tracing::instrument(skip(self, token))]
    pub async fn save(
        &self,
        token: &str,
        location_id: Option<String>,
    ) -> Result<PlatformConfig, BmsError> {
        let token = AccessToken::new(token)?;
        self.probe.list_locations(&token).await?;

        let mut builder = PlatformConfig::builder().access_token(token.expose());
        if let Some(location_id) = location_id {
            builder = builder.location_id(location_id);
        }
        let saved = self.repo.upsert_active(builder.build()?).await?;
        tracing::info!(config_id = %saved.id, "platform configuration saved");
        Ok(saved)
    }

    /// The active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BmsError::NotFound`] when nothing has been saved yet.
    pub async fn active(&self) -> Result<PlatformConfig, BmsError> {
        self.repo.get_active().await?.ok_or_else(|| {
            NotFoundError {
                entity: "PlatformConfig",
                id: "active".to_string(),
            }
            .into()
        })
    }
}
