//! Core library for the city weather dashboard.
//!
//! This crate defines:
//! - The city registry and the weather data model
//! - The Open-Meteo forecast source behind the `ForecastSource` trait
//! - Current-conditions batches and forecast reshaping
//! - Dashboard state, its timers and command execution
//! - Configuration on disk
//!
//! It is used by `weather-cli`, which renders the dashboard in a terminal.

pub mod city;
pub mod conditions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod runtime;

pub use city::{City, CityRegistry};
pub use conditions::{WeatherIcon, current_hour_index, fetch_current_readings};
pub use config::Config;
pub use dashboard::{CityState, Command, Dashboard, ForecastChart, Message, Tab};
pub use error::WeatherError;
pub use forecast::{ChartBounds, fetch_forecast};
pub use model::{ForecastPoint, ForecastRequest, HourlyField, HourlySeries, PanelVariant, Reading};
pub use provider::{ForecastSource, OpenMeteoProvider};
pub use runtime::{Executor, Timers};
