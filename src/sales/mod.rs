use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    prelude::*,
    target::SalesEndpoint,
};

mod config;

pub use self::config::SaleConfig;


/// Body of a `POST /sales` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalePayload {
    pub product: String,
    pub amount: f64,
}

/// A sale as returned by the API after creating it. Only `id` is required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedSale {
    pub id: String,

    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub processed: bool,
}

impl CreatedSale {
    /// Whether `id` can be appended to `/sales/` as a single path segment
    /// without escaping. Only unreserved URL characters are accepted.
    fn has_path_safe_id(&self) -> bool {
        !self.id.is_empty()
            && self.id.bytes().all(|b| b.is_ascii_alphanumeric() || b"-._~".contains(&b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `POST /sales` with a JSON body.
    Create,
    /// `GET /sales/<id>`.
    Read,
}

/// A fully prepared request, independent of the HTTP client sending it.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    pub kind: RequestKind,
    pub url: String,
    /// JSON body. If set, it is sent with `Content-Type: application/json`.
    pub body: Option<String>,
}

impl SaleRequest {
    pub const CONTENT_TYPE: &'static str = "application/json";

    pub fn method(&self) -> http::Method {
        match self.kind {
            RequestKind::Create => http::Method::POST,
            RequestKind::Read => http::Method::GET,
        }
    }

    /// Name used to group requests in load test metrics.
    pub fn name(&self) -> &'static str {
        match self.kind {
            RequestKind::Create => "POST /sales",
            RequestKind::Read => "GET /sales/:id",
        }
    }
}

/// Everything a single invocation needs. Shared read-only by all users of a
/// load test; each invocation builds its own requests from it.
#[derive(Debug, Clone)]
pub struct Workload {
    endpoint: SalesEndpoint,
    product: String,
    amount: f64,
    read_back: bool,
}

impl Workload {
    pub fn new(endpoint: SalesEndpoint, config: &SaleConfig) -> Self {
        Self {
            endpoint,
            product: config.product.clone(),
            amount: config.amount,
            read_back: config.read_back,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = SalesEndpoint::new(config.target.base_address()?.clone());
        Ok(Self::new(endpoint, &config.sale))
    }

    pub fn endpoint(&self) -> &SalesEndpoint {
        &self.endpoint
    }

    pub fn payload(&self) -> SalePayload {
        SalePayload {
            product: self.product.clone(),
            amount: self.amount,
        }
    }

    /// Builds the `POST <base>/sales` request with a freshly serialized payload.
    pub fn create_request(&self) -> SaleRequest {
        // Serializing a string and a float cannot fail.
        let body = serde_json::to_string(&self.payload())
            .expect("failed to serialize sale payload");

        SaleRequest {
            kind: RequestKind::Create,
            url: self.endpoint.collection_url(),
            body: Some(body),
        }
    }

    /// Returns the follow-up `GET <base>/sales/<id>` for a create response
    /// body, if read-back is enabled and the body contains a sale.
    pub fn read_back_request(&self, create_response: &str) -> Option<SaleRequest> {
        if !self.read_back {
            return None;
        }

        match serde_json::from_str::<CreatedSale>(create_response) {
            Ok(sale) if !sale.has_path_safe_id() => {
                debug!(id = ?sale.id, "created sale id is not a plain path segment -> not reading back");
                None
            }
            Ok(sale) => {
                trace!(
                    id = %sale.id,
                    product = %sale.product,
                    amount = sale.amount,
                    processed = sale.processed,
                    "reading back created sale",
                );
                Some(SaleRequest {
                    kind: RequestKind::Read,
                    url: self.endpoint.item_url(&sale.id),
                    body: None,
                })
            }
            Err(e) => {
                debug!("create response is not a sale ({e}) -> not reading back");
                None
            }
        }
    }
}

/// Writes a response body to the diagnostic log, regardless of status.
pub fn log_response(status: u16, body: &str) {
    info!(target: "sales_loadtest::response", status, "{body}");
}
