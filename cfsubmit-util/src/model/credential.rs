use std::fmt;

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// One `name=value` pair copied from an authenticated browser session.
#[derive(Serialize, Deserialize, Getters, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Credential {
    name: String,
    value: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    fn parse(segment: &str) -> Option<Self> {
        let (name, value) = segment.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

// values are secrets, keep them out of debug output
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("value", &"********")
            .finish()
    }
}

/// Domain and path the credentials are valid for.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct CookieScope {
    domain: String,
    path: String,
}

impl CookieScope {
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
        }
    }
}

impl Default for CookieScope {
    fn default() -> Self {
        Self::new("codeforces.com", "/")
    }
}

/// Authentication state for exactly one tracked submission.
///
/// Never persisted. Drivers copy the pairs into their own cookie store when primed.
#[derive(Getters, Debug, Clone, PartialEq, Eq)]
#[get = "pub"]
pub struct SessionContext {
    credentials: Vec<Credential>,
    scope: CookieScope,
}

impl SessionContext {
    /// Parses `name=value; name=value` as pasted from a browser.
    ///
    /// Segments without `=` or with an empty name are dropped. Fails with
    /// `EngineError::InvalidCredentials` when nothing is left.
    pub fn from_credential_str(raw: &str) -> Result<Self> {
        let credentials: Vec<Credential> = raw
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(Credential::parse)
            .collect();
        Self::new(credentials, CookieScope::default())
    }

    pub fn new(credentials: Vec<Credential>, scope: CookieScope) -> Result<Self> {
        if credentials.is_empty() {
            return Err(EngineError::InvalidCredentials.into());
        }
        Ok(Self { credentials, scope })
    }
}
