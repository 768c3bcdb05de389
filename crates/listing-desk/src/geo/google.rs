use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::provider::{
    AddressComponent, AutocompleteRequest, Coordinates, GeocodeResult, MapsProvider,
    NearbyCategory, PlaceDetails, ProviderError,
};
use crate::config::GeoConfig;

const DETAIL_FIELDS: &str = "name,formatted_address,geometry,address_component,plus_code";

/// Google Maps Platform web-service client (Places + Geocoding).
#[derive(Clone)]
pub struct GoogleMapsClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    country: String,
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.base_url)
            .field("country", &self.country)
            .finish_non_exhaustive()
    }
}

impl GoogleMapsClient {
    pub fn new(config: &GeoConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &GeoConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            country: config.country.clone(),
        }
    }

    async fn call<T>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Envelope<T>, ProviderError>
    where
        T: DeserializeOwned,
    {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        debug!(endpoint, status = %envelope.status, "maps provider answered");
        envelope.accepted()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

impl<T> Envelope<T> {
    /// Empty answers (`ZERO_RESULTS`, or `NOT_FOUND` for a stale place id) keep
    /// their empty payload; any other non-OK status is a provider failure.
    fn accepted(self) -> Result<Self, ProviderError> {
        match self.status.as_str() {
            "OK" | "ZERO_RESULTS" | "NOT_FOUND" => Ok(self),
            _ => Err(ProviderError::Status {
                status: self.status,
                message: self.error_message,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionsPayload {
    #[serde(default)]
    predictions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DetailsPayload {
    #[serde(default)]
    result: Option<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct ResultsPayload<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    plus_code: Option<RawPlusCode>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct RawPlusCode {
    #[serde(default)]
    compound_code: Option<String>,
}

#[async_trait]
impl MapsProvider for GoogleMapsClient {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn autocomplete(&self, request: &AutocompleteRequest) -> Result<Vec<Value>, ProviderError> {
        let mut params = vec![
            ("input", request.input.clone()),
            ("types", "geocode".to_string()),
            ("components", format!("country:{}", self.country)),
        ];
        if let Some(token) = &request.session_token {
            params.push(("sessiontoken", token.clone()));
        }

        let envelope: Envelope<PredictionsPayload> =
            self.call("place/autocomplete/json", &params).await?;
        Ok(envelope.payload.predictions)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ProviderError> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", DETAIL_FIELDS.to_string()),
        ];
        let envelope: Envelope<DetailsPayload> = self.call("place/details/json", &params).await?;

        Ok(envelope.payload.result.map(|place| PlaceDetails {
            name: place.name,
            formatted_address: place.formatted_address,
            location: place.geometry.map(|geometry| geometry.location),
            address_components: place.address_components,
            compound_code: place.plus_code.and_then(|code| code.compound_code),
        }))
    }

    async fn nearby(
        &self,
        origin: Coordinates,
        category: NearbyCategory,
        radius_meters: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let params = [
            ("location", format!("{},{}", origin.lat, origin.lng)),
            ("radius", radius_meters.to_string()),
            ("type", category.place_type().to_string()),
        ];
        let envelope: Envelope<ResultsPayload<RawPlace>> =
            self.call("place/nearbysearch/json", &params).await?;

        Ok(envelope
            .payload
            .results
            .into_iter()
            .filter_map(|place| place.name)
            .filter(|name| !name.trim().is_empty())
            .collect())
    }

    async fn reverse_geocode(&self, origin: Coordinates) -> Result<Vec<GeocodeResult>, ProviderError> {
        let params = [("latlng", format!("{},{}", origin.lat, origin.lng))];
        let envelope: Envelope<ResultsPayload<RawPlace>> = self.call("geocode/json", &params).await?;

        Ok(envelope
            .payload
            .results
            .into_iter()
            .map(|place| GeocodeResult {
                place_id: place.place_id,
                formatted_address: place.formatted_address,
                location: place.geometry.map(|geometry| geometry.location),
                address_components: place.address_components,
            })
            .collect())
    }
}
