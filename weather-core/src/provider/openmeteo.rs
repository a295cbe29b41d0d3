use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::{Result, WeatherError},
    model::{ForecastRequest, HourlySeries},
};

use super::ForecastSource;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Open-Meteo forecast endpoint. Keyless, no auth headers.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: HourlySeries,
}

#[async_trait]
impl ForecastSource for OpenMeteoProvider {
    async fn hourly(&self, request: &ForecastRequest) -> Result<HourlySeries> {
        let url = format!("{}/v1/forecast", self.base_url);

        let mut query = vec![
            ("latitude", request.latitude.to_string()),
            ("longitude", request.longitude.to_string()),
            ("hourly", request.hourly_param()),
        ];
        if let Some(days) = request.forecast_days {
            query.push(("forecast_days", days.to_string()));
        }

        tracing::debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            hourly = %request.hourly_param(),
            forecast_days = ?request.forecast_days,
            "requesting hourly forecast"
        );

        let res = self.http.get(&url).query(&query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        Ok(parsed.hourly)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
