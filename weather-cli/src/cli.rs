use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select};
use std::{path::PathBuf, sync::Arc};

use weather_core::{
    CityRegistry, Config, ForecastSource, OpenMeteoProvider, PanelVariant, WeatherIcon,
    current_hour_index, fetch_current_readings, fetch_forecast,
};

use crate::{logging, tui};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "City weather dashboard")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the full-screen dashboard (default).
    Dashboard,

    /// Fetch current conditions for every city once and print them.
    Current {
        /// Temperature only.
        #[arg(long, conflicts_with = "detailed")]
        basic: bool,

        /// Temperature, humidity and wind speed.
        #[arg(long)]
        detailed: bool,
    },

    /// Print the 3-day hourly forecast for a city.
    Forecast {
        /// City name; prompts for one when omitted.
        city: Option<String>,
    },

    /// List the cities the dashboard tracks.
    Cities,

    /// Interactively edit the dashboard settings.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&path)?;
        let registry = CityRegistry::default();
        let command = self.command.unwrap_or(Command::Dashboard);

        // `configure` is how a broken config gets fixed, so it skips validation
        if !matches!(command, Command::Configure) {
            config.validate(&registry)?;
        }

        match command {
            Command::Dashboard => {
                logging::init_file()?;
                tui::run(&config, registry).await
            }
            Command::Current { basic, detailed } => {
                logging::init_stderr();
                let variant = match (basic, detailed) {
                    (true, _) => PanelVariant::Basic,
                    (_, true) => PanelVariant::Detailed,
                    _ => config.panel(),
                };
                print_current(&config, &registry, variant).await
            }
            Command::Forecast { city } => {
                logging::init_stderr();
                let name = match city {
                    Some(name) => name,
                    None => prompt_city(&registry, &config)?,
                };
                print_forecast(&config, &registry, &name).await
            }
            Command::Cities => {
                for city in registry.cities() {
                    println!(
                        "{:<12} {:>9.4} {:>9.4}",
                        city.name, city.latitude, city.longitude
                    );
                }
                Ok(())
            }
            Command::Configure => {
                let updated = configure(config, &registry)?;
                updated.save_to(&path)?;
                println!("Saved configuration to {}", path.display());
                Ok(())
            }
        }
    }
}

fn source(config: &Config) -> Result<Arc<dyn ForecastSource>> {
    let provider = OpenMeteoProvider::with_base_url(config.api_base_url())
        .context("Failed to build HTTP client")?;
    Ok(Arc::new(provider))
}

async fn print_current(config: &Config, registry: &CityRegistry, variant: PanelVariant) -> Result<()> {
    let source = source(config)?;
    let hour = current_hour_index(&Local::now());

    let readings = fetch_current_readings(source.as_ref(), registry.cities(), variant, hour)
        .await
        .context("Error fetching weather data")?;

    for (city, reading) in registry.cities().iter().zip(&readings) {
        let icon = WeatherIcon::for_temperature(reading.temperature_c);
        let mut line = format!(
            "{} {:<12} {:>5.1}°C",
            icon.glyph(),
            city.name,
            reading.temperature_c
        );
        if let Some(humidity) = reading.humidity_pct {
            line.push_str(&format!("  {humidity:>3.0}%"));
        }
        if let Some(wind) = reading.wind_speed_kmh {
            line.push_str(&format!("  {wind:>5.1} km/h"));
        }
        line.push_str(&format!("  updated {}", reading.observed_at.format("%H:%M")));
        println!("{line}");
    }

    Ok(())
}

async fn print_forecast(config: &Config, registry: &CityRegistry, name: &str) -> Result<()> {
    let city = registry.resolve(name)?;
    let source = source(config)?;

    let points = fetch_forecast(source.as_ref(), city)
        .await
        .context("Error fetching forecast data")?;

    println!("{} - 3 Day Forecast", city.name);
    println!(
        "{:<14} {:>16} {:>12} {:>17}",
        "Time", "Temperature (°C)", "Humidity (%)", "Wind Speed (km/h)"
    );
    for p in &points {
        println!(
            "{:<14} {:>16.1} {:>12.0} {:>17.1}",
            p.label, p.temperature_c, p.humidity_pct, p.wind_speed_kmh
        );
    }

    Ok(())
}

fn prompt_city(registry: &CityRegistry, config: &Config) -> Result<String> {
    let names: Vec<&str> = registry.names().collect();
    let start = config
        .default_city(registry)
        .ok()
        .and_then(|c| registry.position(&c.name))
        .unwrap_or(0);

    let choice = Select::new("Select a city", names)
        .with_starting_cursor(start)
        .prompt()
        .context("City selection cancelled")?;

    Ok(choice.to_string())
}

fn configure(mut config: Config, registry: &CityRegistry) -> Result<Config> {
    let panels = PanelVariant::all().to_vec();
    let panel_start = panels.iter().position(|p| *p == config.panel()).unwrap_or(0);
    let panel = Select::new("Current conditions panel", panels)
        .with_starting_cursor(panel_start)
        .prompt()
        .context("Configuration cancelled")?;

    let city = prompt_city(registry, &config)?;

    let refresh = CustomType::<u64>::new("Refresh interval (seconds)")
        .with_default(config.refresh_interval().as_secs())
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Configuration cancelled")?;

    config.panel = Some(panel);
    config.default_city = Some(city);
    config.refresh_interval_secs = Some(refresh);
    config.validate(registry)?;

    Ok(config)
}
