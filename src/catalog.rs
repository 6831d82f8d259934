//! Refill signal to the question-ingestion service.

use std::time::Duration;

/// Fire-and-forget client that pokes the ingestion service when the pool of
/// unseen questions runs low. Failures are logged and swallowed; a missed
/// refill signal only delays new material, it never blocks a study session.
pub struct CatalogClient {
  client: reqwest::Client,
  refill_url: String,
}

impl CatalogClient {
  pub fn new(refill_url: String) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, refill_url })
  }

  pub async fn request_refill(&self) {
    match self.client.post(&self.refill_url).send().await {
      Ok(response) if response.status().is_success() => {
        tracing::info!("Requested catalog refill");
      }
      Ok(response) => {
        tracing::warn!("Catalog refill request returned {}", response.status());
      }
      Err(e) => {
        tracing::warn!("Catalog refill request failed: {}", e);
      }
    }
  }
}
