//! Platform configuration: the single active SmartThings credential record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BmsError, ValidationError};
use crate::id::ConfigId;
use crate::time::{Timestamp, now};

/// A platform access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a non-empty token, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyToken`] when `token` is blank.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Expose the raw secret, e.g. to build an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Display form keeping only the last four characters.
    #[must_use]
    pub fn masked(&self) -> String {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{tail}")
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"<redacted>").finish()
    }
}

/// A location reported by the platform for a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: String,
    pub name: String,
}

/// The active platform configuration. At most one exists per deployment.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub id: ConfigId,
    pub access_token: AccessToken,
    pub location_id: Option<String>,
    pub updated_at: Timestamp,
}

impl PlatformConfig {
    /// Create a builder for constructing a [`PlatformConfig`].
    #[must_use]
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder::default()
    }
}

/// Step-by-step builder for [`PlatformConfig`].
#[derive(Debug, Default)]
pub struct PlatformConfigBuilder {
    id: Option<ConfigId>,
    access_token: Option<String>,
    location_id: Option<String>,
    updated_at: Option<Timestamp>,
}

impl PlatformConfigBuilder {
    #[must_use]
    pub fn id(mut self, id: ConfigId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    #[must_use]
    pub fn updated_at(mut self, updated_at: Timestamp) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Consume the builder, validate, and return a [`PlatformConfig`].
    ///
    /// A blank location id is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`BmsError::Validation`] if the token is missing or empty.
    pub fn build(self) -> Result<PlatformConfig, BmsError> {
        let access_token = AccessToken::new(self.access_token.unwrap_or_default())?;
        Ok(PlatformConfig {
            id: self.id.unwrap_or_default(),
            access_token,
            location_id: self.location_id.filter(|id| !id.trim().is_empty()),
            updated_at: self.updated_at.unwrap_or_else(now),
        })
    }
}
