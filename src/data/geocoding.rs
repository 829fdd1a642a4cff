//! Geocoding through Nominatim (OpenStreetMap)
//!
//! Free-text search and reverse lookup, reduced to the fields a client needs to
//! pick a place and request its forecast.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::FetchError;

/// Base URL for the public Nominatim instance
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const SEARCH_LIMIT: u32 = 10;

/// Nominatim's usage policy requires an identifying User-Agent
const USER_AGENT: &str = concat!("wxdigest/", env!("CARGO_PKG_VERSION"));

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: u64,
    #[serde(default)]
    pub name: String,
    pub display_name: String,
    /// Latitude as Nominatim returns it (a decimal string)
    pub lat: String,
    /// Longitude as Nominatim returns it (a decimal string)
    pub lon: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub addresstype: String,
    #[serde(default)]
    pub address: PlaceAddress,
}

/// Structured address of a place; which parts exist depends on the country
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(rename = "ISO3166-2-lvl4", skip_serializing_if = "Option::is_none")]
    pub iso3166_2_lvl4: Option<String>,
}

/// Reverse lookups answer 200 with an `error` object when nothing is there
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Found(Place),
    Missing { error: String },
}

/// Client for the Nominatim search and reverse endpoints
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    /// Create a client against the public Nominatim instance
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(NOMINATIM_BASE_URL)
    }

    /// Create a client against a custom instance (self-hosted or test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search places matching a free-text query, best match first
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let limit = SEARCH_LIMIT.to_string();
        self.get(
            "search",
            &[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }

    /// Find the place at the given coordinates
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Place, FetchError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let response: ReverseResponse = self
            .get(
                "reverse",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("format", "jsonv2"),
                    ("addressdetails", "1"),
                ],
            )
            .await?;

        match response {
            ReverseResponse::Found(place) => Ok(place),
            ReverseResponse::Missing { error } => Err(FetchError::NotFound(error)),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "Geocoding request");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "Geocoding request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
