//! GSA per-diem rates client.
//!
//! Fan-out/fan-in gateway: the location (lodging) lookup and the M&IE
//! breakdown table are fetched concurrently and combined into one
//! envelope. The GSA API key travels upstream as the `api_key` query
//! parameter and never appears in anything returned to the caller.

use crate::models::{LocationRates, MealRates, PerDiemQuery, PerDiemRates};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GsaError {
    #[error("invalid GSA base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("request failed for {endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GSA API error for {endpoint} ({status}): {body}")]
    UpstreamStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse JSON for {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("location rates fetch failed: {0}")]
    LocationFetch(#[source] Box<GsaError>),

    #[error("meal rates fetch failed: {0}")]
    MealFetch(#[source] Box<GsaError>),
}

impl GsaError {
    /// True when the underlying failure was an upstream 404 (unknown
    /// location or year).
    pub fn is_not_found(&self) -> bool {
        match self {
            GsaError::UpstreamStatus { status, .. } => *status == StatusCode::NOT_FOUND,
            GsaError::LocationFetch(inner) | GsaError::MealFetch(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

/// Where to look up lodging rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLocation {
    Zip(String),
    CityState { city: String, state: String },
}

impl RateLocation {
    /// Build a location from the endpoint's query parameters; ZIP wins
    /// when both forms are present.
    pub fn from_query(query: &PerDiemQuery) -> Option<Self> {
        if let Some(zip) = query.zip_code.as_deref().filter(|z| !z.is_empty()) {
            return Some(RateLocation::Zip(zip.to_string()));
        }
        match (query.city.as_deref(), query.state.as_deref()) {
            (Some(city), Some(state)) if !city.is_empty() && !state.is_empty() => {
                Some(RateLocation::CityState {
                    city: city.to_string(),
                    state: state.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Path segments for the lodging rates endpoint.
    fn rate_segments(&self, year: i32) -> Vec<String> {
        match self {
            RateLocation::Zip(zip) => vec![
                "rates".to_string(),
                "zip".to_string(),
                zip.clone(),
                "year".to_string(),
                year.to_string(),
            ],
            RateLocation::CityState { city, state } => vec![
                "rates".to_string(),
                "city".to_string(),
                city.clone(),
                "state".to_string(),
                state.clone(),
                "year".to_string(),
                year.to_string(),
            ],
        }
    }
}

/// Client for the GSA per-diem API, shared read-only across requests.
#[derive(Clone)]
pub struct GsaClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GsaClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch both halves of the per-diem data concurrently and combine
    /// them. Neither half is emitted unless both succeed; the first error
    /// encountered wins.
    pub async fn fetch_per_diem(
        &self,
        location: &RateLocation,
        year: i32,
    ) -> Result<PerDiemRates, GsaError> {
        let location_segments = location.rate_segments(year);
        let meal_segments = vec![
            "rates".to_string(),
            "conus".to_string(),
            "mie".to_string(),
            year.to_string(),
        ];

        let location_fetch = self.fetch::<LocationRates>(&location_segments);
        let meal_fetch = self.fetch::<Vec<MealRates>>(&meal_segments);

        let (location_data, meal_rates) = tokio::try_join!(
            async { location_fetch.await.map_err(|e| GsaError::LocationFetch(Box::new(e))) },
            async { meal_fetch.await.map_err(|e| GsaError::MealFetch(Box::new(e))) },
        )?;

        Ok(PerDiemRates {
            location_data,
            meal_rates,
        })
    }

    /// GET an endpoint with the API key appended, decoding the body into
    /// the endpoint's typed record.
    async fn fetch<T: DeserializeOwned>(&self, segments: &[String]) -> Result<T, GsaError> {
        let endpoint = segments.join("/");
        let url = self.endpoint_url(segments)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| GsaError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GsaError::UpstreamStatus {
                endpoint,
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| GsaError::Decode { endpoint, source })
    }

    /// Build the full upstream URL, percent-encoding each path segment
    /// (city names contain spaces) and injecting the API key.
    fn endpoint_url(&self, segments: &[String]) -> Result<Url, GsaError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| GsaError::InvalidBaseUrl(e.to_string()))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GsaError::InvalidBaseUrl(self.base_url.clone()))?;
            for segment in segments {
                path.push(segment);
            }
        }

        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}
