//! Registry configuration.

use serde::{Deserialize, Serialize};

use truthchain_core::{AuthorityPolicy, RegistrationPolicy};

use crate::error::{RegistryError, Result};

/// Configuration for a [`DocumentRegistry`](crate::DocumentRegistry).
///
/// Missing fields take their defaults, so `{}` is a valid config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Who controls a new record's modification flag.
    pub authority_policy: AuthorityPolicy,
    /// Who may register documents.
    pub registration: RegistrationPolicy,
    /// Buffered events per subscriber before lagging ones drop events.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            authority_policy: AuthorityPolicy::default(),
            registration: RegistrationPolicy::default(),
            event_capacity: 256,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the registry cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(RegistryError::Config(
                "event_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
