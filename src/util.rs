use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client as HyperClient, connect::HttpConnector};

use crate::prelude::*;


/// Request body for everything we send: small and fully buffered.
pub type RequestBody = Full<Bytes>;

/// HTTP client able to talk to both `http` and `https` targets.
pub type SimpleHttpClient<B = RequestBody> = HyperClient<HttpsConnector<HttpConnector>, B>;

pub fn http_client<B>() -> Result<SimpleHttpClient<B>>
where
    B: Send + hyper::body::Body,
    B::Data: Send,
{
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("failed to load native certificate roots")?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();
    let out = HyperClient::builder(hyper_util::rt::TokioExecutor::new()).build(https);
    Ok(out)
}
