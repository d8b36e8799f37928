//! Access token for the remote terrain provider.
//!
//! The token is supplied out-of-band (environment or a local secret file)
//! and never appears in `Debug`/`Display` output.

use std::fmt;
use std::path::Path;

use floodview_core::error::{FloodError, FloodResult};

/// Environment variable that overrides the token file.
pub const TOKEN_ENV_VAR: &str = "FLOODVIEW_TERRAIN_TOKEN";

/// Default secret file name, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".terrain_token";

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> FloodResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(FloodError::Config("access token is empty".into()));
        }
        Ok(Self(token))
    }

    /// Token from `FLOODVIEW_TERRAIN_TOKEN` if set, else from `path`.
    pub fn load(path: &Path) -> FloodResult<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Self::from_file(path),
        }
    }

    pub fn from_file(path: &Path) -> FloodResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FloodError::Config(format!("cannot read token file {}: {e}", path.display()))
        })?;
        Self::new(contents)
    }

    /// The raw token, for the Authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
