//! Errors raised while loading [`crate::HostConfig`].

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

/// Errors encountered while resolving the host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer failed to load or merge: an unreadable or malformed
    /// configuration file, an invalid environment value or a bad flag.
    #[error("failed to load host configuration: {0}")]
    Load(#[from] Arc<OrthoError>),
}

impl ConfigError {
    /// The loader error behind this failure.
    #[must_use]
    pub fn ortho(&self) -> &OrthoError {
        match self {
            Self::Load(source) => source.as_ref(),
        }
    }
}
