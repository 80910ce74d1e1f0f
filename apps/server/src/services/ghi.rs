// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Daily GHI lookup against the NASA POWER point API.
//!
//! One GET per lookup. Every failure is reported as `None` so callers can
//! show a message and stop; nothing is retried or cached.

use serde::Deserialize;
use std::collections::HashMap;

/// All-sky surface shortwave downward irradiance, kWh/m²/day.
pub const GHI_PARAMETER: &str = "ALLSKY_SFC_SW_DWN";

/// POWER marks days without data with this value.
const FILL_VALUE: f64 = -999.0;

/// GHI point-API client.
#[derive(Debug, Clone)]
pub struct GhiClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, HashMap<String, f64>>,
}

impl GhiClient {
    /// Create a new client for the given endpoint.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Query string for one day at one point.
    pub fn query(lat: f64, lng: f64, date: &str) -> [(&'static str, String); 7] {
        [
            ("parameters", GHI_PARAMETER.to_string()),
            ("community", "RE".to_string()),
            ("longitude", lng.to_string()),
            ("latitude", lat.to_string()),
            ("start", date.to_string()),
            ("end", date.to_string()),
            ("format", "JSON".to_string()),
        ]
    }

    /// Fetch the GHI for `date` (`YYYYMMDD`) at the given coordinates.
    pub async fn fetch(&self, lat: f64, lng: f64, date: &str) -> Option<f64> {
        if !is_valid_date(date) {
            tracing::warn!(date = %date, "Rejecting GHI lookup: date must be YYYYMMDD");
            return None;
        }

        let resp = match self
            .http
            .get(&self.base_url)
            .query(&Self::query(lat, lng, date))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, lat, lng, date = %date, "GHI request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), lat, lng, date = %date, "GHI API returned an error status");
            return None;
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read GHI response body");
                return None;
            }
        };

        let ghi = extract_ghi(&body, date);
        match ghi {
            Some(value) => tracing::info!(lat, lng, date = %date, ghi = value, "Fetched GHI"),
            None => tracing::warn!(lat, lng, date = %date, "GHI response had no usable value"),
        }
        ghi
    }
}

/// Pull `properties.parameter.ALLSKY_SFC_SW_DWN[date]` out of a response body.
pub fn extract_ghi(body: &str, date: &str) -> Option<f64> {
    let parsed: PowerResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed GHI response");
            return None;
        }
    };
    parsed
        .properties
        .parameter
        .get(GHI_PARAMETER)?
        .get(date)
        .copied()
        .filter(|v| v.is_finite() && *v != FILL_VALUE)
}

/// Exactly eight ASCII digits.
pub fn is_valid_date(date: &str) -> bool {
    date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())
}
