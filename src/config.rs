//! Configuration management and validation.
//!
//! Provides the processor configuration: repository connection target,
//! concurrency limits and the repository call deadline.

use crate::constants::REPOSITORY_DEADLINE_SECS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Global configuration for AWIPS processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string (required by `serve`, unused by `parse`)
    pub database_url: Option<String>,

    /// Maximum number of bulletins processed concurrently
    pub max_concurrent_bulletins: usize,

    /// Deadline for a single repository call, in seconds
    pub repository_deadline_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_concurrent_bulletins: num_cpus::get(),
            repository_deadline_secs: REPOSITORY_DEADLINE_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Reads `DATABASE_URL`, `MAX_CONCURRENT_BULLETINS` and
    /// `REPOSITORY_DEADLINE_SECS`; unset variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.database_url = std::env::var("DATABASE_URL").ok();

        if let Ok(value) = std::env::var("MAX_CONCURRENT_BULLETINS") {
            config.max_concurrent_bulletins = value.parse().map_err(|_| {
                Error::configuration(format!("MAX_CONCURRENT_BULLETINS is not a number: {value}"))
            })?;
        }

        if let Ok(value) = std::env::var("REPOSITORY_DEADLINE_SECS") {
            config.repository_deadline_secs = value.parse().map_err(|_| {
                Error::configuration(format!("REPOSITORY_DEADLINE_SECS is not a number: {value}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_bulletins == 0 {
            return Err(Error::configuration(
                "max_concurrent_bulletins must be at least 1",
            ));
        }
        if self.repository_deadline_secs == 0 {
            return Err(Error::configuration(
                "repository_deadline_secs must be at least 1",
            ));
        }
        Ok(())
    }

    /// Set the database connection string
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the concurrent bulletin cap
    pub fn with_max_concurrent_bulletins(mut self, max: usize) -> Self {
        self.max_concurrent_bulletins = max;
        self
    }

    /// Set the repository call deadline
    pub fn with_repository_deadline_secs(mut self, secs: u64) -> Self {
        self.repository_deadline_secs = secs;
        self
    }

    /// The repository call deadline as a [`Duration`]
    pub fn repository_deadline(&self) -> Duration {
        Duration::from_secs(self.repository_deadline_secs)
    }
}
