//! Platform ports: credential probing and the active configuration record.

use std::future::Future;

use bmshub_domain::error::BmsError;
use bmshub_domain::platform_config::{AccessToken, Location, PlatformConfig};

/// Read-only probe against the device platform.
pub trait PlatformProbe {
    /// List the locations visible to `token`.
    ///
    /// Implementations return [`BmsError::Credential`] when the platform
    /// refuses the token and [`BmsError::Gateway`] for any other failure.
    fn list_locations(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Vec<Location>, BmsError>> + Send;
}

/// Storage for the single active [`PlatformConfig`].
pub trait PlatformConfigRepository {
    /// Insert the active configuration, or replace it if one exists.
    ///
    /// Must be a single atomic upsert keyed by a unique constraint, never a
    /// select followed by an insert or update.
    fn upsert_active(
        &self,
        config: PlatformConfig,
    ) -> impl Future<Output = Result<PlatformConfig, BmsError>> + Send;

    /// Fetch the active configuration, if any.
    fn get_active(&self) -> impl Future<Output = Result<Option<PlatformConfig>, BmsError>> + Send;
}
