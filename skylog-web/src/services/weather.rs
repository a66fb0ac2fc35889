//! Open-Meteo weather client
//!
//! Current conditions and the 5-day outlook come from the forecast
//! endpoint; past days come from the ERA5 archive endpoint. Values are
//! requested in metric units and converted to imperial alongside.

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skylog_common::config::WeatherConfig;
use skylog_common::db::{CurrentConditions, DailyRow};
use skylog_common::time::format_date;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::services::validators::DateRange;

const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code";

/// Days shown for a plain (no range) lookup
pub const FORECAST_DAYS: usize = 5;

/// Weather API failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("weather request timed out")]
    Timeout,

    #[error("weather network error: {0}")]
    Network(String),

    #[error("weather API returned HTTP {0}")]
    Status(u16),

    #[error("unexpected weather response: {0}")]
    Parse(String),
}

impl WeatherError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout
        } else if err.is_decode() {
            WeatherError::Parse(err.to_string())
        } else {
            WeatherError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    current: Option<CurrentBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<i64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(default)]
    daily: Option<DailyBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    weather_code: Vec<Option<i64>>,
}

impl DailyBlock {
    /// Zip the parallel arrays into rows; short arrays yield `None`
    fn into_rows(self, max_rows: Option<usize>) -> Vec<DailyRow> {
        let count = max_rows.map_or(self.time.len(), |max| max.min(self.time.len()));
        let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

        self.time
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, date)| {
                let tmax_c = at(&self.temperature_2m_max, i);
                let tmin_c = at(&self.temperature_2m_min, i);
                let precip_mm = at(&self.precipitation_sum, i);
                let code = self.weather_code.get(i).copied().flatten();

                DailyRow {
                    date: date.clone(),
                    tmax_c,
                    tmax_f: c_to_f(tmax_c),
                    tmin_c,
                    tmin_f: c_to_f(tmin_c),
                    precip_mm,
                    precip_in: mm_to_in(precip_mm),
                    weather_code: code,
                    weather_desc: describe_weather_code(code),
                }
            })
            .collect()
    }
}

/// Open-Meteo forecast + archive client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http_client: reqwest::Client,
    forecast_url: String,
    archive_url: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::from_parts(
            &config.forecast_url,
            &config.archive_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn from_parts(
        forecast_url: &str,
        archive_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            forecast_url: forecast_url.to_string(),
            archive_url: archive_url.to_string(),
        })
    }

    /// Current conditions at a point
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError> {
        let response: CurrentResponse = self
            .get_json(
                &self.forecast_url,
                vec![
                    ("latitude", lat.to_string()),
                    ("longitude", lon.to_string()),
                    ("current", CURRENT_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        let current = response.current.unwrap_or_default();
        let code = current.weather_code;

        Ok(CurrentConditions {
            temperature_c: current.temperature_2m,
            temperature_f: c_to_f(current.temperature_2m),
            apparent_c: current.apparent_temperature,
            apparent_f: c_to_f(current.apparent_temperature),
            wind_speed_kmh: current.wind_speed_10m,
            wind_speed_mph: kmh_to_mph(current.wind_speed_10m),
            precipitation_mm: current.precipitation,
            precipitation_in: mm_to_in(current.precipitation),
            weather_code: code,
            weather_desc: describe_weather_code(code),
        })
    }

    /// Daily outlook for today and the next four days
    pub async fn forecast_5d(&self, lat: f64, lon: f64) -> Result<Vec<DailyRow>, WeatherError> {
        let response: DailyResponse = self
            .get_json(
                &self.forecast_url,
                vec![
                    ("latitude", lat.to_string()),
                    ("longitude", lon.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("forecast_days", FORECAST_DAYS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        Ok(response
            .daily
            .unwrap_or_default()
            .into_rows(Some(FORECAST_DAYS)))
    }

    /// Daily rows for an inclusive range
    ///
    /// Past days come from the archive, today onward from the forecast. A
    /// range spanning today is split at `today` and the halves fetched
    /// concurrently; one failed half still yields the other half's rows.
    pub async fn daily_range(
        &self,
        lat: f64,
        lon: f64,
        range: DateRange,
        today: NaiveDate,
    ) -> Result<Vec<DailyRow>, WeatherError> {
        if range.end < today {
            return self
                .daily_rows(&self.archive_url, lat, lon, range.start, range.end)
                .await;
        }

        if range.start >= today {
            return self
                .daily_rows(&self.forecast_url, lat, lon, range.start, range.end)
                .await;
        }

        let yesterday = today - ChronoDuration::days(1);
        let (past, future) = tokio::join!(
            self.daily_rows(&self.archive_url, lat, lon, range.start, yesterday),
            self.daily_rows(&self.forecast_url, lat, lon, today, range.end),
        );

        match (past, future) {
            (Ok(mut past), Ok(future)) => {
                past.extend(future);
                Ok(past)
            }
            (Ok(past), Err(err)) => {
                warn!("Forecast half of date range failed: {}", err);
                Ok(past)
            }
            (Err(err), Ok(future)) => {
                warn!("Archive half of date range failed: {}", err);
                Ok(future)
            }
            (Err(past_err), Err(future_err)) => {
                warn!(
                    "Both halves of date range failed (archive: {}; forecast: {})",
                    past_err, future_err
                );
                Err(past_err)
            }
        }
    }

    async fn daily_rows(
        &self,
        url: &str,
        lat: f64,
        lon: f64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRow>, WeatherError> {
        let response: DailyResponse = self
            .get_json(
                url,
                vec![
                    ("latitude", lat.to_string()),
                    ("longitude", lon.to_string()),
                    ("start_date", format_date(start)),
                    ("end_date", format_date(end)),
                    ("daily", DAILY_FIELDS.to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        Ok(response.daily.unwrap_or_default().into_rows(None))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T, WeatherError> {
        debug!(url = %url, "Querying weather API");

        let response = self
            .http_client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(WeatherError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(WeatherError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

/// Celsius to Fahrenheit
pub fn c_to_f(celsius: Option<f64>) -> Option<f64> {
    celsius.map(|c| c * 9.0 / 5.0 + 32.0)
}

/// Millimetres to inches
pub fn mm_to_in(mm: Option<f64>) -> Option<f64> {
    mm.map(|v| v / 25.4)
}

/// Kilometres per hour to miles per hour
pub fn kmh_to_mph(kmh: Option<f64>) -> Option<f64> {
    kmh.map(|v| v / 1.609_344)
}

/// Human-readable WMO weather code
pub fn describe_weather_code(code: Option<i64>) -> String {
    let Some(code) = code else {
        return "—".to_string();
    };

    let desc = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm w/ slight hail",
        99 => "Thunderstorm w/ heavy hail",
        other => return format!("Code {}", other),
    };

    desc.to_string()
}
