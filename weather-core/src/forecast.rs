use crate::{
    city::City,
    error::{Result, WeatherError},
    model::{ForecastPoint, ForecastRequest, HourlyField, HourlySeries},
    provider::ForecastSource,
};

pub const FORECAST_DAYS: u8 = 3;

const LABEL_FORMAT: &str = "%d %b %H:%M";

pub fn forecast_request(city: &City) -> ForecastRequest {
    ForecastRequest {
        latitude: city.latitude,
        longitude: city.longitude,
        fields: HourlyField::all().to_vec(),
        forecast_days: Some(FORECAST_DAYS),
    }
}

/// Reshape the parallel hourly arrays into one point per timestamp.
///
/// Hours where the API reported `null` for any of the three values are left out
/// of the chart rather than failing the whole forecast.
pub fn points_from_series(series: &HourlySeries) -> Result<Vec<ForecastPoint>> {
    let temperature = series.values(HourlyField::Temperature)?;
    let humidity = series.values(HourlyField::Humidity)?;
    let wind = series.values(HourlyField::WindSpeed)?;

    let mut points = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let observed_at = series.timestamp(i)?;
        let (Some(temperature_c), Some(humidity_pct), Some(wind_speed_kmh)) = (
            sample(temperature, HourlyField::Temperature, i)?,
            sample(humidity, HourlyField::Humidity, i)?,
            sample(wind, HourlyField::WindSpeed, i)?,
        ) else {
            continue;
        };
        points.push(ForecastPoint {
            label: observed_at.format(LABEL_FORMAT).to_string(),
            observed_at,
            temperature_c,
            humidity_pct,
            wind_speed_kmh,
        });
    }

    let skipped = series.len() - points.len();
    if skipped > 0 {
        tracing::debug!(skipped, "hours with null samples left out of the forecast");
    }
    Ok(points)
}

fn sample(values: &[Option<f64>], field: HourlyField, index: usize) -> Result<Option<f64>> {
    values.get(index).copied().ok_or(WeatherError::ShortSeries {
        field: field.api_name(),
        index,
        len: values.len(),
    })
}

pub async fn fetch_forecast(source: &dyn ForecastSource, city: &City) -> Result<Vec<ForecastPoint>> {
    let series = source.hourly(&forecast_request(city)).await?;
    let points = points_from_series(&series)?;
    tracing::debug!(city = %city.name, points = points.len(), "forecast reshaped");
    Ok(points)
}

/// Value ranges for the chart's two numeric axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    /// Temperature and humidity.
    pub left: [f64; 2],
    /// Wind speed.
    pub right: [f64; 2],
}

impl ChartBounds {
    pub fn from_points(points: &[ForecastPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let left = span(
            points
                .iter()
                .flat_map(|p| [p.temperature_c, p.humidity_pct]),
        );
        let right = span(points.iter().map(|p| p.wind_speed_kmh));

        Some(Self { left, right })
    }

    /// Map a wind speed onto the left axis so all series can share one plot area.
    pub fn right_to_left(&self, value: f64) -> f64 {
        let [r0, r1] = self.right;
        let [l0, l1] = self.left;
        l0 + (value - r0) / (r1 - r0) * (l1 - l0)
    }
}

fn span(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    // flat series still need a non-zero range
    if hi - lo < f64::EPSILON {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo.floor(), hi.ceil()]
    }
}
