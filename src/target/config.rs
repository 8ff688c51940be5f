use std::collections::HashMap;

use crate::prelude::*;
use super::BaseAddress;


#[derive(Debug, confique::Config)]
#[config(validate = Self::validate)]
pub struct TargetConfig {
    /// Named base addresses of the sales API. Requests go to `<address>/sales`.
    /// Addresses must include the scheme and must not end with a slash.
    ///
    ///    [target]
    ///    environments.production = "https://api.msfidelis.com.br"
    ///    environments.local = "http://0.0.0.0:8080"
    #[config(default = {
        "production": "https://api.msfidelis.com.br",
        "local": "http://0.0.0.0:8080"
    })]
    pub environments: HashMap<String, BaseAddress>,

    /// Which entry of `environments` to send requests to.
    #[config(default = "production", env = "SALES_LOADTEST_ENVIRONMENT")]
    pub environment: String,

    /// If set, requests go to this address and `environment` is ignored.
    #[config(env = "SALES_LOADTEST_BASE_ADDRESS")]
    pub base_address: Option<BaseAddress>,
}

impl TargetConfig {
    fn validate(&self) -> Result<(), String> {
        self.base_address().map(|_| ()).map_err(|e| e.to_string())
    }

    /// The base address requests are sent to.
    pub fn base_address(&self) -> Result<&BaseAddress> {
        if let Some(address) = &self.base_address {
            return Ok(address);
        }

        self.environments.get(&self.environment).ok_or_else(|| {
            let mut known = self.environments.keys().map(String::as_str).collect::<Vec<_>>();
            known.sort_unstable();
            anyhow!(
                "unknown environment '{}' (configured: {})",
                self.environment,
                known.join(", "),
            )
        })
    }
}
