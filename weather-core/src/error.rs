use thiserror::Error;

/// Failures of a single fetch or of the reshaping that follows it.
///
/// Every variant aborts the update it occurred in; the dashboard logs it and
/// keeps showing whatever it had before.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode forecast response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Forecast response is missing the hourly field '{0}'")]
    MissingField(&'static str),

    #[error("Hourly series '{field}' has {len} samples, no sample at index {index}")]
    ShortSeries {
        field: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Hourly series '{field}' has no value at index {index}")]
    MissingSample { field: &'static str, index: usize },

    #[error("Unparseable timestamp '{0}' in hourly series")]
    Timestamp(String),

    #[error("Unknown city '{0}'")]
    UnknownCity(String),

    #[error("Invalid city registry: {0}")]
    InvalidRegistry(String),
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
