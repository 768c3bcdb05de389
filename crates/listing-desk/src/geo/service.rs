use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use super::address::{plus_code_area, AddressBreakdown};
use super::nearby::{distinct_names, enrich, NearbySettings};
use super::provider::{AutocompleteRequest, Coordinates, MapsProvider, ProviderError};

pub const MIN_AUTOCOMPLETE_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub address: AddressBreakdown,
    pub nearby: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("Google Maps API key is not configured")]
    Configuration,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Upstream geocoding request failed")]
    Upstream { status: u16 },
    #[error("{0}")]
    NotFound(String),
    #[error("Geocoding provider error: {0}")]
    Provider(String),
}

impl GeoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GeoError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            GeoError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GeoError::Upstream { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GeoError::NotFound(_) => StatusCode::NOT_FOUND,
            GeoError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ProviderError> for GeoError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::MissingCredential => GeoError::Configuration,
            ProviderError::Upstream { status } => GeoError::Upstream { status },
            ProviderError::Status { status, message } => GeoError::Provider(match message {
                Some(message) => format!("{status}: {message}"),
                None => status,
            }),
            ProviderError::Transport(detail) | ProviderError::Decode(detail) => {
                GeoError::Provider(detail)
            }
        }
    }
}

impl IntoResponse for GeoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, %status, "geo lookup failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Address lookups proxied to the mapping provider.
pub struct GeoService<P: ?Sized> {
    provider: Arc<P>,
    nearby: NearbySettings,
}

impl<P> GeoService<P>
where
    P: MapsProvider + ?Sized,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_settings(provider, NearbySettings::default())
    }

    pub fn with_settings(provider: Arc<P>, nearby: NearbySettings) -> Self {
        Self { provider, nearby }
    }

    fn ensure_credential(&self) -> Result<(), GeoError> {
        if self.provider.has_credential() {
            Ok(())
        } else {
            Err(GeoError::Configuration)
        }
    }

    /// Short inputs answer with no predictions and never reach the provider.
    pub async fn autocomplete(
        &self,
        input: Option<&str>,
        session_token: Option<&str>,
    ) -> Result<Vec<Value>, GeoError> {
        self.ensure_credential()?;

        let input = input.map(str::trim).unwrap_or_default();
        if input.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }

        let request = AutocompleteRequest {
            input: input.to_string(),
            session_token: session_token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        };
        Ok(self.provider.autocomplete(&request).await?)
    }

    pub async fn place_details(&self, place_id: Option<&str>) -> Result<PlaceSummary, GeoError> {
        self.ensure_credential()?;

        let place_id = place_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GeoError::InvalidRequest("placeId is required".to_string()))?;

        let details = self
            .provider
            .place_details(place_id)
            .await?
            .ok_or_else(|| GeoError::NotFound(format!("No place found for id {place_id}")))?;

        let address = AddressBreakdown::from_components(
            details.formatted_address,
            details.location,
            &details.address_components,
        );

        let mut hints = address.hints();
        hints.extend(details.compound_code.as_deref().and_then(plus_code_area));

        let nearby = match details.location {
            Some(origin) => enrich(self.provider.as_ref(), origin, &hints, self.nearby).await,
            None => distinct_names(&hints),
        };

        Ok(PlaceSummary {
            place_id: place_id.to_string(),
            name: details.name,
            address,
            nearby,
        })
    }

    pub async fn reverse(
        &self,
        lat: Option<&str>,
        lng: Option<&str>,
    ) -> Result<AddressBreakdown, GeoError> {
        self.ensure_credential()?;

        let origin = parse_coordinates(lat, lng)?;
        let first = self
            .provider
            .reverse_geocode(origin)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                GeoError::NotFound(format!(
                    "No address found for {},{}",
                    origin.lat, origin.lng
                ))
            })?;

        Ok(AddressBreakdown::from_components(
            first.formatted_address,
            first.location.or(Some(origin)),
            &first.address_components,
        ))
    }
}

fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinates, GeoError> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(GeoError::InvalidRequest(
            "lat and lng query parameters are required".to_string(),
        ));
    };

    let parse = |raw: &str| raw.trim().parse::<f64>().ok();
    parse(lat)
        .zip(parse(lng))
        .and_then(|(lat, lng)| Coordinates::new(lat, lng))
        .ok_or_else(|| {
            GeoError::InvalidRequest(format!("invalid coordinates: lat={lat}, lng={lng}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_must_parse_and_be_in_range() {
        assert!(parse_coordinates(Some("18.52"), Some("73.85")).is_ok());
        assert!(matches!(
            parse_coordinates(Some("north"), Some("73.85")),
            Err(GeoError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_coordinates(Some("95"), Some("73.85")),
            Err(GeoError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_coordinates(None, Some("73.85")),
            Err(GeoError::InvalidRequest(_))
        ));
    }

    #[test]
    fn upstream_status_passes_through() {
        let err = GeoError::from(ProviderError::Upstream { status: 503 });
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Upstream geocoding request failed");
        assert_eq!(
            GeoError::from(ProviderError::MissingCredential).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
