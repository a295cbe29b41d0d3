use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, WeatherError};

/// A named coordinate the dashboard polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Ordered, immutable list of cities. Names are unique and the list is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRegistry {
    cities: Vec<City>,
}

impl CityRegistry {
    pub fn new(cities: Vec<City>) -> Result<Self> {
        if cities.is_empty() {
            return Err(WeatherError::InvalidRegistry(
                "at least one city is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for city in &cities {
            if !seen.insert(city.name.as_str()) {
                return Err(WeatherError::InvalidRegistry(format!(
                    "duplicate city name '{}'",
                    city.name
                )));
            }
        }

        Ok(Self { cities })
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(|c| c.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Like [`find`](Self::find), but a miss is an error.
    pub fn resolve(&self, name: &str) -> Result<&City> {
        self.find(name)
            .ok_or_else(|| WeatherError::UnknownCity(name.to_string()))
    }

    pub fn first(&self) -> &City {
        &self.cities[0]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.cities.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self {
            cities: vec![
                City::new("Delhi", 28.6139, 77.2090),
                City::new("Bangalore", 12.9716, 77.5946),
                City::new("Mumbai", 19.0760, 72.8777),
                City::new("Gulbarga", 17.3297, 76.8343),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_four_cities_in_order() {
        let registry = CityRegistry::default();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["Delhi", "Bangalore", "Mumbai", "Gulbarga"]);
        assert_eq!(registry.first().name, "Delhi");
    }

    #[test]
    fn resolve_unknown_city_errors() {
        let registry = CityRegistry::default();
        let err = registry.resolve("Paris").unwrap_err();
        assert!(err.to_string().contains("Unknown city 'Paris'"));
    }

    #[test]
    fn find_returns_coordinates() {
        let registry = CityRegistry::default();
        let mumbai = registry.find("Mumbai").expect("Mumbai is registered");
        assert_eq!(mumbai.latitude, 19.0760);
        assert_eq!(mumbai.longitude, 72.8777);
        assert_eq!(registry.position("Mumbai"), Some(2));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = CityRegistry::new(vec![
            City::new("Delhi", 28.6139, 77.2090),
            City::new("Delhi", 0.0, 0.0),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate city name 'Delhi'"));
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(CityRegistry::new(Vec::new()).is_err());
    }
}
