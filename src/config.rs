//! Container configuration.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default recursion ceiling for graph population.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Environment variable read by [`ContainerConfig::from_env`].
pub const MAX_DEPTH_ENV: &str = "FERROUS_INJECT_MAX_DEPTH";

/// Tunables for a [`Container`](crate::Container).
///
/// `max_depth` bounds recursive resolution. Cycle detection runs before
/// population, so the ceiling only trips on cycles that pass through
/// capability requirements.
///
/// # Examples
///
/// ```
/// use ferrous_inject::{Container, ContainerConfig};
///
/// let config = ContainerConfig::default().with_max_depth(64);
/// assert_eq!(config.max_depth, 64);
///
/// let container = Container::with_config(config);
/// assert_eq!(container.config().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerConfig {
    /// Maximum depth of recursive resolution
    pub max_depth: usize,
}

impl ContainerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Defaults overridden by `FERROUS_INJECT_MAX_DEPTH` when it holds a positive integer.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var(MAX_DEPTH_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.max_depth = depth,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", MAX_DEPTH_ENV),
            }
        }
        config
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
