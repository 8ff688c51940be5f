use std::fmt;

use serde::Deserialize;

mod config;

pub use self::config::TargetConfig;


/// Path of the sales resource, appended verbatim to the base address.
pub const SALES_PATH: &str = "/sales";


/// Base address of the sales API, e.g. `https://api.example.com`.
///
/// The string is kept exactly as configured: URLs are built by plain
/// concatenation, never by joining or normalizing paths. That is why a
/// trailing slash is rejected, as it would result in `//sales`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct BaseAddress(String);

impl BaseAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BaseAddress {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim() != s {
            return Err("base address has trailing or leading whitespace".into());
        }
        if s.ends_with('/') {
            return Err("base address must not end with '/'".into());
        }
        if s.contains('#') {
            return Err("base address must not contain fragment part (#...)".into());
        }

        let uri: http::Uri = s.parse().map_err(|e| format!("invalid URI: {e}"))?;
        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(_) => return Err("base address must use HTTP or HTTPS scheme".into()),
            None => return Err("invalid URI: does not contain scheme".into()),
        }
        match uri.authority() {
            None => return Err("base address must have authority part".into()),
            Some(authority) if authority.as_str().contains('@')
                => return Err("base address must not contain user part".into()),
            _ => {}
        }
        if uri.query().is_some() {
            return Err("base address must not contain query part".into());
        }

        Ok(Self(s))
    }
}

/// The sales resource of one specific target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesEndpoint {
    base: BaseAddress,
}

impl SalesEndpoint {
    pub fn new(base: BaseAddress) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BaseAddress {
        &self.base
    }

    /// URL to create sales at: `<base>/sales`.
    pub fn collection_url(&self) -> String {
        format!("{}{SALES_PATH}", self.base)
    }

    /// URL of a single sale: `<base>/sales/<id>`.
    pub fn item_url(&self, id: &str) -> String {
        format!("{}{SALES_PATH}/{id}", self.base)
    }
}
