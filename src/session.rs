//! Explicit session state for one logged-in user.
//!
//! The replaced system kept the logged-in user in process-global session
//! flags; here a [`Session`] is a plain value constructed once per
//! request/response cycle and passed by reference to whatever needs it.

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Check a username/password pair against the configured credential map.
///
/// A static lookup, nothing more; see the config docs for why.
pub fn authenticate(config: &Config, user: &str, password: &str) -> bool {
    config
        .credentials
        .get(user)
        .is_some_and(|expected| expected == password)
}

/// A logged-in user's session.
#[derive(Debug, Clone)]
pub struct Session {
    user: String,
}

impl Session {
    /// Open a session for `user`, enforcing the login gate when one is
    /// configured. With an empty credential map any user name is accepted.
    pub fn login(config: &Config, user: &str, password: Option<&str>) -> Result<Self> {
        if !config.credentials.is_empty()
            && !authenticate(config, user, password.unwrap_or(""))
        {
            return Err(Error::InvalidCredentials(user.to_string()));
        }
        info!(user, "session opened");
        Ok(Self {
            user: user.to_string(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Path of this user's accumulated record file.
    pub fn store_path(&self, config: &Config) -> PathBuf {
        config
            .store
            .data_dir
            .join(format!("records_{}.csv", self.user))
    }
}
