//! Weather tool backed by WeatherAPI.
//!
//! Fetches current conditions plus today's forecast for a location and
//! formats them into a one-paragraph summary for the responder.

use std::time::Instant;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::tools::tool::{Tool, ToolError, ToolOutput, require_str_any};

const BASE_URL: &str = "http://api.weatherapi.com/v1";

/// WeatherAPI forecast tool.
pub struct WeatherTool {
    http: reqwest::Client,
    api_key: Option<SecretString>,
}

impl WeatherTool {
    pub fn new(http: reqwest::Client, api_key: Option<SecretString>) -> Self {
        Self { http, api_key }
    }

    async fn fetch(&self, location: &str) -> Result<WeatherResponse, ToolError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ToolError::NotConfigured("WEATHER_API_KEY is not set".to_string()))?;

        let response = self
            .http
            .get(format!("{}/forecast.json", BASE_URL))
            .query(&[("key", key.expose_secret()), ("q", location), ("aqi", "no")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "weather provider returned {}: {}",
                status,
                provider_message(&body)
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Fetches current weather and today's forecast for a given location."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City or location name, e.g. \"Paris\""
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let city = require_str_any(&params, &["city", "location", "input", "q"])?;

        let start = Instant::now();
        let data = self.fetch(city).await?;
        Ok(ToolOutput::text(format_summary(&data), start.elapsed()))
    }
}

/// Pull the human-readable message out of a WeatherAPI error body.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn format_summary(data: &WeatherResponse) -> String {
    let current = &data.current;
    let mut summary = format!(
        "Currently, it's {} in {} with {}°C (feels like {}°C) and humidity at {}%.",
        current.condition.text.to_lowercase(),
        data.location.name,
        current.temp_c,
        current.feelslike_c,
        current.humidity,
    );

    if let Some(day) = data.forecast.forecastday.first().map(|f| &f.day) {
        summary.push_str(&format!(
            " Today's forecast: {}, highs of {}°C and lows of {}°C. Chance of rain is {}%.",
            day.condition.text.to_lowercase(),
            day.maxtemp_c,
            day.mintemp_c,
            day.daily_chance_of_rain,
        ));
    }

    summary
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    location: Location,
    current: Current,
    #[serde(default)]
    forecast: Forecast,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    condition: Condition,
    temp_c: f64,
    feelslike_c: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    day: Day,
}

#[derive(Debug, Deserialize)]
struct Day {
    maxtemp_c: f64,
    mintemp_c: f64,
    #[serde(default)]
    daily_chance_of_rain: i64,
    condition: Condition,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "location": {"name": "Paris"},
        "current": {
            "condition": {"text": "Partly cloudy"},
            "temp_c": 21.0,
            "feelslike_c": 20.5,
            "humidity": 60
        },
        "forecast": {
            "forecastday": [{
                "day": {
                    "maxtemp_c": 24.0,
                    "mintemp_c": 14.0,
                    "daily_chance_of_rain": 10,
                    "condition": {"text": "Sunny"}
                }
            }]
        }
    }"#;

    #[test]
    fn test_format_summary_full_payload() {
        let data: WeatherResponse = serde_json::from_str(SAMPLE).unwrap();
        let summary = format_summary(&data);
        assert!(summary.contains("partly cloudy in Paris"));
        assert!(summary.contains("21°C"));
        assert!(summary.contains("feels like 20.5°C"));
        assert!(summary.contains("highs of 24°C"));
        assert!(summary.contains("Chance of rain is 10%"));
    }

    #[test]
    fn test_format_summary_without_forecast() {
        let data: WeatherResponse = serde_json::from_str(
            r#"{
                "location": {"name": "Oslo"},
                "current": {
                    "condition": {"text": "Clear"},
                    "temp_c": 3.0,
                    "feelslike_c": -1.0,
                    "humidity": 80
                }
            }"#,
        )
        .unwrap();
        let summary = format_summary(&data);
        assert!(summary.contains("clear in Oslo"));
        assert!(!summary.contains("forecast"));
    }

    #[test]
    fn test_provider_message_extraction() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        assert_eq!(provider_message(body), "No matching location found.");
        assert_eq!(provider_message("plain text failure"), "plain text failure");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let tool = WeatherTool::new(reqwest::Client::new(), None);
        let err = tool
            .execute(serde_json::json!({"city": "Paris"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_missing_city_parameter() {
        let tool = WeatherTool::new(
            reqwest::Client::new(),
            Some(SecretString::from("test-key")),
        );
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingParameter(_)));
    }
}
