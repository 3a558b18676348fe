// Reader session.
// Login status and the viewer token, with cache invalidation on every transition.

use std::env::VarError;

use tracing::{error, info};

use crate::cache::PreloadCache;
use crate::data::Environment;
use crate::error::{BlogError, Result};
use crate::github::Credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    Checking,
    LoggedIn,
    LoggedOut,
    Error,
}

impl LoginStatus {
    pub fn display(&self) -> &'static str {
        match self {
            LoginStatus::Checking => "Checking login",
            LoginStatus::LoggedIn => "Logged in",
            LoginStatus::LoggedOut => "Logged out",
            LoginStatus::Error => "Login error",
        }
    }
}

/// Login state plus the credentials shared with the GraphQL client.
#[derive(Debug)]
pub struct Session {
    status: LoginStatus,
    credentials: Credentials,
    viewer_token_env: String,
}

impl Session {
    pub fn new(credentials: Credentials, viewer_token_env: impl Into<String>) -> Self {
        Self {
            status: LoginStatus::Checking,
            credentials,
            viewer_token_env: viewer_token_env.into(),
        }
    }

    pub fn status(&self) -> LoginStatus {
        self.status
    }

    pub fn is_logged_in(&self) -> bool {
        self.status == LoginStatus::LoggedIn
    }

    /// Views are keyed by this; a change means the route must be preloaded again.
    pub fn login_key(&self) -> &'static str {
        if self.is_logged_in() {
            "logged-in"
        } else {
            "logged-out"
        }
    }

    /// Resolve the initial status from the credentials already present.
    pub fn check(&mut self) {
        self.status = if self.credentials.is_set() {
            LoginStatus::LoggedIn
        } else {
            LoginStatus::LoggedOut
        };
    }

    /// Log in with the viewer token from the environment.
    pub fn login(&mut self, cache: &PreloadCache, env: &Environment) -> Result<()> {
        let lookup = std::env::var(&self.viewer_token_env);
        self.login_with(cache, env, lookup)
    }

    pub fn login_with(
        &mut self,
        cache: &PreloadCache,
        env: &Environment,
        lookup: std::result::Result<String, VarError>,
    ) -> Result<()> {
        let token = match lookup {
            Ok(token) if !token.trim().is_empty() => token.trim().to_string(),
            Ok(_) | Err(VarError::NotPresent) => {
                return Err(BlogError::MissingToken(self.viewer_token_env.clone()));
            }
            Err(VarError::NotUnicode(_)) => {
                error!(var = %self.viewer_token_env, "viewer token is not valid unicode");
                self.status = LoginStatus::Error;
                return Err(BlogError::Other(format!(
                    "{} is not valid unicode",
                    self.viewer_token_env
                )));
            }
        };

        self.credentials.set(token);
        cache.clear(env);
        self.check();
        info!(status = ?self.status, "logged in");
        Ok(())
    }

    /// Forget the viewer token.
    pub fn logout(&mut self, cache: &PreloadCache, env: &Environment) {
        self.credentials.clear();
        cache.clear(env);
        self.check();
        info!(status = ?self.status, "logged out");
    }
}
