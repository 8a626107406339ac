//! HTTP seam between the controller and the backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::FormError;
use crate::response::RawResponse;

/// Sends a JSON body and hands back the unclassified response.
///
/// Implementations only fail with [`FormError::Network`]; status codes and
/// content types are the controller's business.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
  async fn post_json(&self, url: &Url, body: &Value) -> Result<RawResponse, FormError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(timeout: Duration) -> Result<Self, FormError> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("fundscout/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self { client })
  }

  pub fn from_client(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn post_json(&self, url: &Url, body: &Value) -> Result<RawResponse, FormError> {
    tracing::debug!(%url, "POST");

    let response = self.client.post(url.clone()).json(body).send().await?;

    let status = response.status().as_u16();
    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .map(str::to_string);
    let body = response.bytes().await?;

    tracing::debug!(%url, status, bytes = body.len(), content_type = ?content_type, "response");
    Ok(RawResponse { status, content_type, body })
  }
}
