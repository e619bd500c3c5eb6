//! Remote sun times API — `GET /json/sun/{lat}/{lon}/{date}` returning a
//! status envelope with named local datetimes, all implicitly UTC.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use sunup_core::config::SunTimesConfig;
use sunup_core::{Coordinates, EventKind, Result, SunEventTimes, SunTimesService, SunupError};

/// Client for the remote sun event service.
pub struct RemoteSunApi {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl RemoteSunApi {
    pub fn new(config: &SunTimesConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn request_url(&self, coordinates: Coordinates, date: NaiveDate) -> String {
        format!(
            "{}/json/sun/{:.6}/{:.6}/{}",
            self.base_url,
            coordinates.latitude,
            coordinates.longitude,
            date.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl SunTimesService for RemoteSunApi {
    async fn sun_event_times(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<SunEventTimes> {
        let url = self.request_url(coordinates, date);
        tracing::debug!("Fetching sun times: {url}");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SunupError::service(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SunupError::service(format!("HTTP {}", response.status())));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| SunupError::service(format!("invalid response: {e}")))?;

        parse_response(body)
    }
}

/// Wire format of the remote service.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: HashMap<String, NaiveDateTime>,
}

fn parse_response(body: ApiResponse) -> Result<SunEventTimes> {
    if body.status != "OK" {
        return Err(SunupError::service(format!(
            "remote service error: {}",
            body.message.unwrap_or(body.status)
        )));
    }

    let time_of = |kind: EventKind| body.results.get(kind.api_key()).map(|dt| dt.time());

    let sunrise = time_of(EventKind::Sunrise)
        .ok_or_else(|| SunupError::service("response is missing sunrise"))?;
    let sunset = time_of(EventKind::Sunset)
        .ok_or_else(|| SunupError::service("response is missing sunset"))?;

    Ok(SunEventTimes {
        sunrise,
        sunset,
        civil_twilight_begin: time_of(EventKind::CivilTwilightBegin),
        civil_twilight_end: time_of(EventKind::CivilTwilightEnd),
    })
}
