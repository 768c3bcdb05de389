use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{json, Value};

use crate::geo::provider::{
    AddressComponent, AutocompleteRequest, Coordinates, GeocodeResult, MapsProvider,
    NearbyCategory, PlaceDetails, ProviderError,
};
use crate::geo::service::GeoService;

/// Scripted provider recording every call it receives.
pub(super) struct FakeMaps {
    pub(super) credential: bool,
    pub(super) predictions: Vec<Value>,
    pub(super) details: Option<PlaceDetails>,
    pub(super) details_error: Option<ProviderError>,
    pub(super) nearby: HashMap<NearbyCategory, Result<Vec<String>, ProviderError>>,
    pub(super) reverse: Result<Vec<GeocodeResult>, ProviderError>,
    pub(super) calls: Mutex<Vec<String>>,
}

impl Default for FakeMaps {
    fn default() -> Self {
        Self {
            credential: false,
            predictions: Vec::new(),
            details: None,
            details_error: None,
            nearby: HashMap::new(),
            reverse: Ok(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeMaps {
    pub(super) fn configured() -> Self {
        Self {
            credential: true,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex").clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls mutex").push(call.into());
    }
}

#[async_trait]
impl MapsProvider for FakeMaps {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn autocomplete(&self, request: &AutocompleteRequest) -> Result<Vec<Value>, ProviderError> {
        self.record(format!("autocomplete:{}", request.input));
        Ok(self.predictions.clone())
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ProviderError> {
        self.record(format!("details:{place_id}"));
        match &self.details_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.details.clone()),
        }
    }

    async fn nearby(
        &self,
        _origin: Coordinates,
        category: NearbyCategory,
        _radius_meters: u32,
    ) -> Result<Vec<String>, ProviderError> {
        self.record(format!("nearby:{}", category.place_type()));
        self.nearby
            .get(&category)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn reverse_geocode(&self, origin: Coordinates) -> Result<Vec<GeocodeResult>, ProviderError> {
        self.record(format!("reverse:{},{}", origin.lat, origin.lng));
        self.reverse.clone()
    }
}

pub(super) fn component(name: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        long_name: name.to_string(),
        short_name: name.to_string(),
        types: types.iter().map(|tag| tag.to_string()).collect(),
    }
}

pub(super) fn pune_components() -> Vec<AddressComponent> {
    vec![
        component("Shivajinagar", &["sublocality_level_1", "sublocality", "political"]),
        component("Pune", &["locality", "political"]),
        component("Pune", &["administrative_area_level_2", "political"]),
        component("Maharashtra", &["administrative_area_level_1", "political"]),
        component("411005", &["postal_code"]),
    ]
}

pub(super) fn pune_place() -> PlaceDetails {
    PlaceDetails {
        name: Some("Shivajinagar".to_string()),
        formatted_address: Some("Shivajinagar, Pune, Maharashtra 411005, India".to_string()),
        location: Coordinates::new(18.5314, 73.8446),
        address_components: pune_components(),
        compound_code: Some("GRJV+HR Model Colony, Pune, Maharashtra, India".to_string()),
    }
}

pub(super) fn geo_service(maps: FakeMaps) -> (Arc<GeoService<FakeMaps>>, Arc<FakeMaps>) {
    let maps = Arc::new(maps);
    (Arc::new(GeoService::new(maps.clone())), maps)
}

pub(super) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(null))
}

pub(super) async fn assert_error(response: Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!(message));
}
