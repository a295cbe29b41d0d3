//! Current conditions for every registered city.
//!
//! A refresh is one *batch*: a request per city, issued concurrently and joined.
//! The batch either yields a reading for every city or fails as a whole; callers
//! apply nothing on failure, so a single bad city never leaves the tiles half
//! updated.

use chrono::Timelike;
use futures_util::future::try_join_all;

use crate::{
    city::City,
    error::Result,
    model::{ForecastRequest, PanelVariant, Reading},
    provider::ForecastSource,
};

/// Index into the hourly arrays used as "now": the local wall-clock hour.
///
/// The response's own timestamps are not consulted. If the upstream series does
/// not start at local midnight this picks the wrong sample.
pub fn current_hour_index<T: Timelike>(now: &T) -> usize {
    now.hour() as usize
}

pub fn current_request(city: &City, variant: PanelVariant) -> ForecastRequest {
    ForecastRequest {
        latitude: city.latitude,
        longitude: city.longitude,
        fields: variant.fields().to_vec(),
        forecast_days: variant.forecast_days(),
    }
}

/// Fetch one reading per city, in registry order.
pub async fn fetch_current_readings(
    source: &dyn ForecastSource,
    cities: &[City],
    variant: PanelVariant,
    hour_index: usize,
) -> Result<Vec<Reading>> {
    let requests = cities.iter().map(|city| async move {
        let series = source.hourly(&current_request(city, variant)).await?;
        Reading::from_series(&series, hour_index, variant.fields())
    });

    try_join_all(requests).await
}

/// Tile icon chosen from temperature alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sun,
    Cloud,
    Droplet,
}

impl WeatherIcon {
    pub fn for_temperature(temperature_c: f64) -> Self {
        if temperature_c > 30.0 {
            WeatherIcon::Sun
        } else if temperature_c > 20.0 {
            WeatherIcon::Cloud
        } else {
            WeatherIcon::Droplet
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "☀",
            WeatherIcon::Cloud => "☁",
            WeatherIcon::Droplet => "☂",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "sun",
            WeatherIcon::Cloud => "cloud",
            WeatherIcon::Droplet => "droplet",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HourlyField;
    use crate::provider::testing::{StubSource, day_series};
    use chrono::NaiveTime;

    fn two_cities() -> Vec<City> {
        vec![
            City::new("Delhi", 28.6139, 77.2090),
            City::new("Bangalore", 12.9716, 77.5946),
        ]
    }

    #[test]
    fn hour_index_is_wall_clock_hour() {
        let at = NaiveTime::from_hms_opt(14, 7, 0).unwrap();
        assert_eq!(current_hour_index(&at), 14);
        let midnight = NaiveTime::from_hms_opt(0, 59, 59).unwrap();
        assert_eq!(current_hour_index(&midnight), 0);
    }

    #[test]
    fn icon_thresholds() {
        assert_eq!(WeatherIcon::for_temperature(31.0), WeatherIcon::Sun);
        assert_eq!(WeatherIcon::for_temperature(30.0), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::for_temperature(25.0), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::for_temperature(20.0), WeatherIcon::Droplet);
        assert_eq!(WeatherIcon::for_temperature(19.9), WeatherIcon::Droplet);
        assert_eq!(WeatherIcon::for_temperature(-5.0), WeatherIcon::Droplet);
    }

    #[test]
    fn request_shape_follows_variant() {
        let city = City::new("Delhi", 28.6139, 77.2090);
        let basic = current_request(&city, PanelVariant::Basic);
        assert_eq!(basic.fields, vec![HourlyField::Temperature]);
        assert_eq!(basic.forecast_days, None);

        let detailed = current_request(&city, PanelVariant::Detailed);
        assert_eq!(detailed.fields.len(), 3);
        assert_eq!(detailed.forecast_days, Some(1));
    }

    #[tokio::test]
    async fn batch_reads_the_current_hour_for_every_city() {
        let source = StubSource::default()
            .with(28.6139, day_series(10.0))
            .with(12.9716, day_series(0.0));

        let readings = fetch_current_readings(&source, &two_cities(), PanelVariant::Detailed, 9)
            .await
            .expect("both cities succeed");

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].temperature_c, 19.0);
        assert_eq!(readings[1].temperature_c, 9.0);
        assert_eq!(readings[0].humidity_pct, Some(49.0));
        assert_eq!(readings[0].wind_speed_kmh, Some(9.5));
        assert_eq!(readings[0].observed_at.format("%H:%M").to_string(), "09:00");
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn one_failing_city_fails_the_batch() {
        let source = StubSource::default()
            .with(28.6139, day_series(10.0))
            .failing(12.9716);

        let result =
            fetch_current_readings(&source, &two_cities(), PanelVariant::Basic, 9).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn short_series_fails_the_batch() {
        let mut short = day_series(10.0);
        short.time.truncate(5);
        short.temperature_2m.as_mut().unwrap().truncate(5);
        let source = StubSource::default()
            .with(28.6139, day_series(10.0))
            .with(12.9716, short);

        let err = fetch_current_readings(&source, &two_cities(), PanelVariant::Basic, 9)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no sample at index 9"));
    }
}
