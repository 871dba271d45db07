//! Session-token seam.
//!
//! The feed requires a rotating token in its `v` query parameter. How
//! the token is obtained (typically by watching a page load in a
//! browser automation, which can take tens of seconds) is outside this
//! crate — callers plug in whatever provider they have.

use common::{Error, Result};

/// Source of the feed session token.
pub trait TokenProvider {
    /// Resolve a token for the current refresh cycle. Implementations
    /// backed by browser automation may block for tens of seconds and
    /// should enforce their own timeout.
    fn resolve(&self) -> Result<String>;
}

/// A token handed in directly (CLI flag, test fixture).
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn resolve(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(Error::Token("empty session token".into()));
        }
        Ok(self.0.clone())
    }
}

/// A token read from an environment variable on each resolve.
#[derive(Debug, Clone)]
pub struct EnvToken(pub String);

impl TokenProvider for EnvToken {
    fn resolve(&self) -> Result<String> {
        match std::env::var(&self.0) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(Error::Token(format!("{} is not set", self.0))),
        }
    }
}
