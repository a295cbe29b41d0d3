use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

/// Timestamp layout of the `hourly.time` array, e.g. `2024-05-01T14:00`.
const SERIES_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Hourly variables the dashboard asks the API for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HourlyField {
    Temperature,
    Humidity,
    WindSpeed,
}

impl HourlyField {
    /// Parameter name as it appears in the request and response.
    pub fn api_name(&self) -> &'static str {
        match self {
            HourlyField::Temperature => "temperature_2m",
            HourlyField::Humidity => "relativehumidity_2m",
            HourlyField::WindSpeed => "windspeed_10m",
        }
    }

    pub const fn all() -> &'static [HourlyField] {
        &[
            HourlyField::Temperature,
            HourlyField::Humidity,
            HourlyField::WindSpeed,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub fields: Vec<HourlyField>,
    /// `None` leaves the day count to the API default.
    pub forecast_days: Option<u8>,
}

impl ForecastRequest {
    /// Comma separated `hourly` query value.
    pub fn hourly_param(&self) -> String {
        self.fields
            .iter()
            .map(HourlyField::api_name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// The `hourly` object of a forecast response. Arrays are aligned by index to `time`;
/// the API reports an hour it has no value for as `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub relativehumidity_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub windspeed_10m: Option<Vec<Option<f64>>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn values(&self, field: HourlyField) -> Result<&[Option<f64>]> {
        let values = match field {
            HourlyField::Temperature => &self.temperature_2m,
            HourlyField::Humidity => &self.relativehumidity_2m,
            HourlyField::WindSpeed => &self.windspeed_10m,
        };
        values
            .as_deref()
            .ok_or(WeatherError::MissingField(field.api_name()))
    }

    /// Value of `field` at `index`. Past the end is `ShortSeries`, a `null` is `MissingSample`.
    pub fn sample(&self, field: HourlyField, index: usize) -> Result<f64> {
        let values = self.values(field)?;
        let slot = values.get(index).ok_or(WeatherError::ShortSeries {
            field: field.api_name(),
            index,
            len: values.len(),
        })?;
        slot.ok_or(WeatherError::MissingSample {
            field: field.api_name(),
            index,
        })
    }

    pub fn timestamp(&self, index: usize) -> Result<NaiveDateTime> {
        let raw = self.time.get(index).ok_or(WeatherError::ShortSeries {
            field: "time",
            index,
            len: self.time.len(),
        })?;
        parse_series_time(raw)
    }
}

pub(crate) fn parse_series_time(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, SERIES_TIME_FORMAT)
        .map_err(|_| WeatherError::Timestamp(raw.to_string()))
}

/// One city's conditions at one hour. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub temperature_c: f64,
    pub humidity_pct: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub observed_at: NaiveDateTime,
}

impl Reading {
    /// Pick sample `index` out of `series` for each of `fields`.
    ///
    /// Temperature is always required; humidity and wind are read only when listed.
    pub fn from_series(
        series: &HourlySeries,
        index: usize,
        fields: &[HourlyField],
    ) -> Result<Self> {
        let optional = |field: HourlyField| -> Result<Option<f64>> {
            if fields.contains(&field) {
                series.sample(field, index).map(Some)
            } else {
                Ok(None)
            }
        };

        Ok(Self {
            temperature_c: series.sample(HourlyField::Temperature, index)?,
            humidity_pct: optional(HourlyField::Humidity)?,
            wind_speed_kmh: optional(HourlyField::WindSpeed)?,
            observed_at: series.timestamp(index)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub observed_at: NaiveDateTime,
    /// Human-readable form of `observed_at` for axis labels and tables.
    pub label: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
}

/// Which fields the current-conditions tiles show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelVariant {
    /// Temperature and update time only.
    Basic,
    /// Temperature, humidity, wind speed and update time.
    #[default]
    Detailed,
}

impl PanelVariant {
    pub fn fields(&self) -> &'static [HourlyField] {
        match self {
            PanelVariant::Basic => &[HourlyField::Temperature],
            PanelVariant::Detailed => HourlyField::all(),
        }
    }

    pub fn forecast_days(&self) -> Option<u8> {
        match self {
            PanelVariant::Basic => None,
            PanelVariant::Detailed => Some(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelVariant::Basic => "basic",
            PanelVariant::Detailed => "detailed",
        }
    }

    pub const fn all() -> &'static [PanelVariant] {
        &[PanelVariant::Basic, PanelVariant::Detailed]
    }
}

impl std::fmt::Display for PanelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> HourlySeries {
        HourlySeries {
            time: vec!["2024-05-01T00:00".into(), "2024-05-01T01:00".into()],
            temperature_2m: Some(vec![Some(21.5), Some(22.0)]),
            relativehumidity_2m: Some(vec![Some(60.0), Some(58.0)]),
            windspeed_10m: None,
        }
    }

    #[test]
    fn hourly_param_joins_api_names() {
        let req = ForecastRequest {
            latitude: 1.0,
            longitude: 2.0,
            fields: HourlyField::all().to_vec(),
            forecast_days: Some(3),
        };
        assert_eq!(
            req.hourly_param(),
            "temperature_2m,relativehumidity_2m,windspeed_10m"
        );
    }

    #[test]
    fn basic_reading_skips_unrequested_fields() {
        let reading = Reading::from_series(&series(), 1, PanelVariant::Basic.fields())
            .expect("index 1 exists");
        assert_eq!(reading.temperature_c, 22.0);
        assert_eq!(reading.humidity_pct, None);
        assert_eq!(reading.wind_speed_kmh, None);
        assert_eq!(
            reading.observed_at.format("%H:%M").to_string(),
            "01:00"
        );
    }

    #[test]
    fn detailed_reading_requires_every_field() {
        let err = Reading::from_series(&series(), 0, PanelVariant::Detailed.fields()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingField("windspeed_10m")));
    }

    #[test]
    fn index_past_end_is_short_series() {
        let err = Reading::from_series(&series(), 5, PanelVariant::Basic.fields()).unwrap_err();
        assert!(matches!(
            err,
            WeatherError::ShortSeries {
                field: "temperature_2m",
                index: 5,
                len: 2
            }
        ));
    }

    #[test]
    fn null_sample_is_missing_not_short() {
        let mut s = series();
        s.temperature_2m = Some(vec![Some(21.5), None]);

        assert_eq!(s.sample(HourlyField::Temperature, 0).unwrap(), 21.5);
        let err = Reading::from_series(&s, 1, PanelVariant::Basic.fields()).unwrap_err();
        assert!(matches!(
            err,
            WeatherError::MissingSample {
                field: "temperature_2m",
                index: 1
            }
        ));
    }

    #[test]
    fn nulls_deserialize_as_gaps() {
        let s: HourlySeries = serde_json::from_str(
            r#"{"time":["2024-05-01T00:00","2024-05-01T01:00"],"temperature_2m":[null,18.25]}"#,
        )
        .unwrap();
        assert_eq!(s.temperature_2m, Some(vec![None, Some(18.25)]));
        assert!(s.windspeed_10m.is_none());
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let mut s = series();
        s.time[0] = "yesterday".into();
        let err = s.timestamp(0).unwrap_err();
        assert!(matches!(err, WeatherError::Timestamp(raw) if raw == "yesterday"));
    }

    #[test]
    fn panel_variant_request_shape() {
        assert_eq!(PanelVariant::Basic.forecast_days(), None);
        assert_eq!(PanelVariant::Detailed.forecast_days(), Some(1));
        assert_eq!(PanelVariant::default(), PanelVariant::Detailed);
    }
}
