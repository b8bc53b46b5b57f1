use std::time::Duration;

use async_trait::async_trait;
use scry_core::query_client::{HttpRequest, HttpResponse, HttpTransport, TransportError};

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| TransportError::new(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(&request.url)
            .header("Authorization", &request.auth_header)
            .header("Content-Type", "application/json")
            .json(&request.body)
            .send()
            .await
            .map_err(to_transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(to_transport_error)?;
        Ok(HttpResponse::new(status, body))
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

fn to_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::new(format!("connection failed: {error}"))
    } else if error.is_timeout() {
        TransportError::new(format!("request timed out: {error}"))
    } else if error.is_request() {
        TransportError::new(format!("request failed: {error}"))
    } else {
        TransportError::new(error.to_string())
    }
}
