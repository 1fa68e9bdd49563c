//! Weather collaborator backed by the Open-Meteo public APIs.
//!
//! Two-step lookup: geocode the city name, then fetch current conditions for
//! the coordinates. Condition codes follow the WMO 4677 interpretation table.

use async_trait::async_trait;
use serde::Deserialize;
use vox_common::{Result, VoxError, WeatherReport, WeatherSource};

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeHit>,
}

#[derive(Deserialize)]
struct GeocodeHit {
    latitude: f64,
    longitude: f64,
    name: String,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    weathercode: i64,
}

pub struct OpenMeteoWeather {
    client: reqwest::Client,
}

impl OpenMeteoWeather {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn geocode(&self, city: &str) -> Result<GeocodeHit> {
        let url = format!(
            "{GEOCODE_URL}?name={}&count=1&language=en&format=json",
            urlencoding::encode(city)
        );
        let data: GeocodeResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VoxError::Collaborator(format!("geocoding request failed: {e}")))?
            .json()
            .await
            .map_err(|e| VoxError::Collaborator(format!("geocoding response malformed: {e}")))?;

        data.results
            .into_iter()
            .next()
            .ok_or_else(|| VoxError::Collaborator(format!("unknown location: {city}")))
    }
}

impl Default for OpenMeteoWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoWeather {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        let hit = self.geocode(city).await?;

        let url = format!(
            "{FORECAST_URL}?latitude={}&longitude={}&current_weather=true&temperature_unit=celsius",
            hit.latitude, hit.longitude
        );
        let data: ForecastResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VoxError::Collaborator(format!("forecast request failed: {e}")))?
            .json()
            .await
            .map_err(|e| VoxError::Collaborator(format!("forecast response malformed: {e}")))?;

        let current = data
            .current_weather
            .ok_or_else(|| VoxError::Collaborator("forecast missing current weather".to_string()))?;

        Ok(WeatherReport {
            city: hit.name,
            temp_c: current.temperature,
            description: weather_desc(current.weathercode).to_string(),
        })
    }
}

/// WMO 4677 weather interpretation codes.
fn weather_desc(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Drizzle: Light",
        53 => "Drizzle: Moderate",
        55 => "Drizzle: Dense",
        56 => "Freezing Drizzle: Light",
        57 => "Freezing Drizzle: Dense",
        61 => "Rain: Slight",
        63 => "Rain: Moderate",
        65 => "Rain: Heavy",
        66 => "Freezing Rain: Light",
        67 => "Freezing Rain: Heavy",
        71 => "Snow fall: Slight",
        73 => "Snow fall: Moderate",
        75 => "Snow fall: Heavy",
        77 => "Snow grains",
        80 => "Rain showers: Slight",
        81 => "Rain showers: Moderate",
        82 => "Rain showers: Violent",
        85 => "Snow showers: Slight",
        86 => "Snow showers: Heavy",
        95 => "Thunderstorm: Slight or moderate",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_codes_cover_common_conditions() {
        assert_eq!(weather_desc(0), "Clear sky");
        assert_eq!(weather_desc(61), "Rain: Slight");
        assert_eq!(weather_desc(95), "Thunderstorm: Slight or moderate");
        assert_eq!(weather_desc(42), "Unknown conditions");
    }
}
