//! Dashboard state and the transitions that drive it.
//!
//! [`Dashboard`] holds everything the screen shows. It never performs I/O itself:
//! [`Dashboard::update`] applies a [`Message`] and returns the [`Command`]s the
//! caller should run, whose results come back as further messages. See
//! [`crate::runtime`] for the side that runs them.

use chrono::{DateTime, Local};

use crate::{
    city::{City, CityRegistry},
    conditions::current_hour_index,
    error::Result,
    forecast::FORECAST_DAYS,
    model::{ForecastPoint, PanelVariant, Reading},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Current,
    Forecast,
}

impl Tab {
    pub const fn all() -> &'static [Tab] {
        &[Tab::Current, Tab::Forecast]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Current => "Current Weather",
            Tab::Forecast => "Forecast",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Current => Tab::Forecast,
            Tab::Forecast => Tab::Current,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityState {
    pub city: City,
    /// `None` until the first successful batch.
    pub reading: Option<Reading>,
}

/// Input to the dashboard: timer ticks, user actions and fetch results.
#[derive(Debug)]
pub enum Message {
    /// Clock tick. Only moves the displayed time.
    Tick(DateTime<Local>),
    /// Manual refresh. Ignored while a batch is in flight.
    Refresh(DateTime<Local>),
    /// Periodic refresh from the timer. Always starts a new batch.
    TimerRefresh(DateTime<Local>),
    ReadingsFetched(Result<Vec<Reading>>),
    SelectCity(String),
    ForecastFetched {
        generation: u64,
        city: String,
        result: Result<Vec<ForecastPoint>>,
    },
    SwitchTab(Tab),
}

/// Work the dashboard asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchCurrent {
        cities: Vec<City>,
        variant: PanelVariant,
        hour_index: usize,
    },
    FetchForecast {
        city: City,
        generation: u64,
    },
}

/// Forecast tab state for the selected city.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastChart {
    city: City,
    generation: u64,
    loading: bool,
    points: Vec<ForecastPoint>,
}

impl ForecastChart {
    fn new(city: City) -> Self {
        Self {
            city,
            generation: 0,
            loading: true,
            points: Vec::new(),
        }
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn title(&self) -> String {
        format!("{} - {} Day Forecast", self.city.name, FORECAST_DAYS)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn request(&mut self, city: City) -> Command {
        self.generation += 1;
        if city != self.city {
            // never show one city's series under another city's title
            self.points.clear();
            self.city = city.clone();
        }
        self.loading = true;
        Command::FetchForecast {
            city,
            generation: self.generation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    registry: CityRegistry,
    cities: Vec<CityState>,
    variant: PanelVariant,
    loading: bool,
    now: DateTime<Local>,
    selected: String,
    tab: Tab,
    chart: ForecastChart,
}

impl Dashboard {
    /// Build an unmounted dashboard. `selected` defaults to the first registered city.
    pub fn new(
        registry: CityRegistry,
        variant: PanelVariant,
        selected: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let selected_city = match selected {
            Some(name) => registry.resolve(name)?.clone(),
            None => registry.first().clone(),
        };

        let cities = registry
            .cities()
            .iter()
            .cloned()
            .map(|city| CityState {
                city,
                reading: None,
            })
            .collect();

        Ok(Self {
            selected: selected_city.name.clone(),
            chart: ForecastChart::new(selected_city),
            registry,
            cities,
            variant,
            loading: true,
            now,
            tab: Tab::default(),
        })
    }

    /// Initial fetches: the current-conditions batch and the selected city's forecast.
    pub fn mount(&mut self) -> Vec<Command> {
        self.loading = true;
        let selected = self.chart.city.clone();
        vec![self.batch_command(self.now), self.chart.request(selected)]
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Tick(now) => {
                self.now = now;
                Vec::new()
            }
            Message::Refresh(at) => {
                if self.loading {
                    tracing::debug!("refresh ignored, a batch is already in flight");
                    return Vec::new();
                }
                self.loading = true;
                vec![self.batch_command(at)]
            }
            Message::TimerRefresh(at) => {
                self.loading = true;
                vec![self.batch_command(at)]
            }
            Message::ReadingsFetched(result) => {
                self.apply_readings(result);
                Vec::new()
            }
            Message::SelectCity(name) => self.select_city(&name).into_iter().collect(),
            Message::ForecastFetched {
                generation,
                city,
                result,
            } => {
                self.apply_forecast(generation, &city, result);
                Vec::new()
            }
            Message::SwitchTab(tab) => {
                self.tab = tab;
                Vec::new()
            }
        }
    }

    fn batch_command(&self, at: DateTime<Local>) -> Command {
        Command::FetchCurrent {
            cities: self.registry.cities().to_vec(),
            variant: self.variant,
            hour_index: current_hour_index(&at),
        }
    }

    fn apply_readings(&mut self, result: Result<Vec<Reading>>) {
        self.loading = false;

        let readings = match result {
            Ok(readings) => readings,
            Err(err) => {
                tracing::error!(error = %err, "Error fetching weather data");
                return;
            }
        };

        if readings.len() != self.cities.len() {
            tracing::error!(
                expected = self.cities.len(),
                got = readings.len(),
                "batch size does not match the registry, update skipped"
            );
            return;
        }

        for (state, reading) in self.cities.iter_mut().zip(readings) {
            state.reading = Some(reading);
        }
        tracing::info!(cities = self.cities.len(), "current conditions updated");
    }

    fn select_city(&mut self, name: &str) -> Option<Command> {
        let city = match self.registry.resolve(name) {
            Ok(city) => city.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "city selection rejected");
                return None;
            }
        };

        if self.selected == city.name {
            return None;
        }

        self.selected = city.name.clone();
        Some(self.chart.request(city))
    }

    fn apply_forecast(&mut self, generation: u64, city: &str, result: Result<Vec<ForecastPoint>>) {
        if generation != self.chart.generation {
            tracing::debug!(city, generation, "discarding forecast for a superseded selection");
            return;
        }

        self.chart.loading = false;
        match result {
            Ok(points) => self.chart.points = points,
            Err(err) => tracing::error!(city, error = %err, "Error fetching forecast data"),
        }
    }

    /// Name of the city `offset` places away from the selection, wrapping around.
    pub fn adjacent_city(&self, offset: isize) -> &str {
        let len = self.registry.len() as isize;
        let current = self.registry.position(&self.selected).unwrap_or(0) as isize;
        let index = (current + offset).rem_euclid(len) as usize;
        &self.registry.cities()[index].name
    }

    pub fn registry(&self) -> &CityRegistry {
        &self.registry
    }

    pub fn cities(&self) -> &[CityState] {
        &self.cities
    }

    pub fn variant(&self) -> PanelVariant {
        self.variant
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    pub fn selected_city(&self) -> &str {
        &self.selected
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn chart(&self) -> &ForecastChart {
        &self.chart
    }
}
