use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::{ForecastRequest, HourlySeries},
};

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Anything that can answer an hourly forecast request.
///
/// Implementations perform exactly one upstream call per invocation: no caching,
/// no deduplication of identical concurrent requests.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn hourly(&self, request: &ForecastRequest) -> Result<HourlySeries>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::WeatherError;
    use std::{sync::Mutex, time::Duration};

    /// Canned source keyed by latitude. Records every request it sees.
    #[derive(Debug, Default)]
    pub struct StubSource {
        responses: Vec<(f64, Option<HourlySeries>)>,
        delay: Option<Duration>,
        pub requests: Mutex<Vec<ForecastRequest>>,
    }

    impl StubSource {
        pub fn with(mut self, latitude: f64, series: HourlySeries) -> Self {
            self.responses.push((latitude, Some(series)));
            self
        }

        /// Requests at `latitude` fail with a 500.
        pub fn failing(mut self, latitude: f64) -> Self {
            self.responses.push((latitude, None));
            self
        }

        /// Every answer takes `delay` of (tokio) time.
        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().map(|r| r.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ForecastSource for StubSource {
        async fn hourly(&self, request: &ForecastRequest) -> Result<HourlySeries> {
            if let Ok(mut seen) = self.requests.lock() {
                seen.push(request.clone());
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self
                .responses
                .iter()
                .find(|(lat, _)| *lat == request.latitude)
            {
                Some((_, Some(series))) => Ok(series.clone()),
                _ => Err(WeatherError::Status {
                    status: 500,
                    body: "stub failure".to_string(),
                }),
            }
        }
    }

    /// A day of hourly data where every value at hour `h` is `base + h`.
    pub fn day_series(base: f64) -> HourlySeries {
        let hours = 0..24;
        HourlySeries {
            time: hours
                .clone()
                .map(|h| format!("2024-05-01T{h:02}:00"))
                .collect(),
            temperature_2m: Some(hours.clone().map(|h| Some(base + h as f64)).collect()),
            relativehumidity_2m: Some(hours.clone().map(|h| Some(40.0 + h as f64)).collect()),
            windspeed_10m: Some(hours.map(|h| Some(5.0 + h as f64 / 2.0)).collect()),
        }
    }
}
