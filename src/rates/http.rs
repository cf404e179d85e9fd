//! HTTP-backed rate source (enabled with the `live-rates` feature)

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::RateSource;

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: HashMap<String, f64>,
}

/// Fetches rates from a JSON endpoint of the shape `{"rates": {"EUR": 0.92}}`
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<HashMap<String, f64>> {
        let payload: RatesPayload = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("rate feed request failed")?
            .error_for_status()
            .context("rate feed returned an error status")?
            .json()
            .await
            .context("rate feed returned malformed JSON")?;

        Ok(payload.rates)
    }
}
