//! Runs invocations directly over a `hyper` client, without the load test
//! runner. Used by the `once` command to smoke-test a target.

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::{StatusCode, header};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{
    Client as HyperClient,
    connect::{Connect, HttpConnector},
};

use crate::{
    prelude::*,
    sales::{self, SaleRequest, Workload},
    util::RequestBody,
};


/// What the target answered.
#[derive(Debug)]
pub struct Outcome {
    pub status: StatusCode,
    pub body: String,
}

impl Outcome {
    /// Turns a non-2xx status into an error. The body has already been
    /// logged at this point, so the error only names the status.
    pub fn into_result(self) -> Result<Self> {
        if !self.status.is_success() {
            bail!("target responded with status {}", self.status);
        }
        Ok(self)
    }
}

pub struct Executor<C = HttpsConnector<HttpConnector>> {
    client: HyperClient<C, RequestBody>,
}

impl Executor {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(crate::util::http_client()?))
    }
}

impl<C> Executor<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    pub fn with_client(client: HyperClient<C, RequestBody>) -> Self {
        Self { client }
    }

    /// Sends a single request and logs the response body, whatever the
    /// status. Only transport failures are errors; the status is left to the
    /// caller. Nothing is retried.
    pub async fn execute(&self, request: &SaleRequest) -> Result<Outcome> {
        trace!(url = %request.url, "sending {}", request.name());

        let mut builder = hyper::Request::builder()
            .method(request.method())
            .uri(request.url.as_str());
        let body = match &request.body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, SaleRequest::CONTENT_TYPE);
                Full::new(Bytes::from(body.clone()))
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder.body(body)
            .with_context(|| format!("failed to build request for '{}'", request.url))?;

        let response = self.client.request(req).await
            .with_context(|| format!("{} to '{}' failed", request.name(), request.url))?;
        let status = response.status();
        let bytes = response.into_body().collect().await
            .context("failed to read response body")?
            .to_bytes();
        let body = String::from_utf8_lossy(&bytes).into_owned();

        sales::log_response(status.as_u16(), &body);
        Ok(Outcome { status, body })
    }

    /// One full invocation: create a sale and, if enabled, read it back.
    /// Returns the outcome of the create request.
    pub async fn run(&self, workload: &Workload) -> Result<Outcome> {
        let outcome = self.execute(&workload.create_request()).await?;
        if let Some(read) = workload.read_back_request(&outcome.body) {
            self.execute(&read).await?;
        }
        Ok(outcome)
    }
}


#[cfg(test)]
mod tests {
    use confique::Config as _;
    use hyper_util::rt::TokioExecutor;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use crate::{
        sales::SaleConfig,
        target::{BaseAddress, SalesEndpoint},
    };
    use super::*;

    fn executor() -> Executor<HttpConnector> {
        Executor::with_client(HyperClient::builder(TokioExecutor::new()).build_http())
    }

    fn workload(base: &str, read_back: bool) -> Workload {
        let mut config = SaleConfig::builder().load().unwrap();
        config.read_back = read_back;
        let base = BaseAddress::try_from(base.to_owned()).unwrap();
        Workload::new(SalesEndpoint::new(base), &config)
    }

    async fn mock_create(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/sales"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "product": "teste", "amount": 223.34 })))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn created() {
        let server = MockServer::start().await;
        mock_create(&server, ResponseTemplate::new(201).set_body_string(r#"{"id":"abc123"}"#))
            .await;

        let outcome = executor().run(&workload(&server.uri(), false)).await.unwrap();
        assert_eq!(outcome.status, StatusCode::CREATED);
        assert_eq!(outcome.body, r#"{"id":"abc123"}"#);

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].url.as_str(), format!("{}/sales", server.uri()));
    }

    #[tokio::test]
    async fn server_error_body_is_still_returned() {
        let server = MockServer::start().await;
        mock_create(&server, ResponseTemplate::new(500).set_body_string("error")).await;

        let (logs, _guard) = crate::log::capture();
        let outcome = executor().run(&workload(&server.uri(), false)).await.unwrap();
        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.body, "error");

        let out = logs.contents();
        let line = out.lines()
            .find(|line| line.contains("sales_loadtest::response"))
            .unwrap_or_else(|| panic!("no response line in:\n{out}"));
        assert!(line.contains("status=500"), "{line}");
        assert!(line.contains("error"), "{line}");

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "target responded with status 500 Internal Server Error");
    }

    #[tokio::test]
    async fn created_body_is_logged() {
        let server = MockServer::start().await;
        mock_create(&server, ResponseTemplate::new(201).set_body_string(r#"{"id":"abc123"}"#))
            .await;

        let (logs, _guard) = crate::log::capture();
        let outcome = executor().run(&workload(&server.uri(), false)).await.unwrap();
        assert!(outcome.into_result().is_ok());

        let out = logs.contents();
        assert!(out.contains("status=201"), "{out}");
        assert!(out.contains(r#"{"id":"abc123"}"#), "{out}");
    }

    #[test]
    fn only_success_statuses_are_ok() {
        let outcome = |status: u16| Outcome {
            status: StatusCode::from_u16(status).unwrap(),
            body: String::new(),
        };

        assert!(outcome(200).into_result().is_ok());
        assert!(outcome(201).into_result().is_ok());
        assert!(outcome(204).into_result().is_ok());
        assert!(outcome(301).into_result().is_err());
        assert!(outcome(404).into_result().is_err());
        assert!(outcome(503).into_result().is_err());
    }

    #[tokio::test]
    async fn connection_refused_is_not_retried() {
        // Grab a free port and release it again, so nothing listens there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = executor().run(&workload(&format!("http://{addr}"), false)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn identical_requests() {
        let server = MockServer::start().await;
        mock_create(&server, ResponseTemplate::new(201)).await;

        let executor = executor();
        let workload = workload(&server.uri(), false);
        executor.run(&workload).await.unwrap();
        executor.run(&workload).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].url, received[1].url);
        assert_eq!(received[0].method, received[1].method);
        assert_eq!(received[0].body, received[1].body);
        assert_eq!(
            received[0].headers.get("content-type"),
            received[1].headers.get("content-type"),
        );
    }

    #[tokio::test]
    async fn reads_back_created_sale() {
        let server = MockServer::start().await;
        let sale = r#"{"id":"abc123","product":"teste","amount":223.34,"processed":false}"#;
        mock_create(&server, ResponseTemplate::new(201).set_body_string(sale)).await;
        Mock::given(method("GET"))
            .and(path("/sales/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sale))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = executor().run(&workload(&server.uri(), true)).await.unwrap();
        assert_eq!(outcome.status, StatusCode::CREATED);
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_read_back_after_error() {
        let server = MockServer::start().await;
        mock_create(&server, ResponseTemplate::new(500).set_body_string("error")).await;

        executor().run(&workload(&server.uri(), true)).await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
