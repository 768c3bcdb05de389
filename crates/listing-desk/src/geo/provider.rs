use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|candidate| candidate == tag)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Option<Coordinates>,
    pub address_components: Vec<AddressComponent>,
    /// Plus code compound form, e.g. `7JWV+2V Koramangala, Bengaluru, Karnataka`.
    pub compound_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Option<Coordinates>,
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteRequest {
    pub input: String,
    pub session_token: Option<String>,
}

/// Place types the nearby enrichment searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NearbyCategory {
    SubwayStation,
    TrainStation,
    TransitStation,
    PointOfInterest,
    School,
    Hospital,
}

impl NearbyCategory {
    /// Transit lookups tried in order until one yields a name.
    pub const TRANSIT_CHAIN: [Self; 4] = [
        Self::SubwayStation,
        Self::TrainStation,
        Self::TransitStation,
        Self::PointOfInterest,
    ];

    pub const fn place_type(self) -> &'static str {
        match self {
            Self::SubwayStation => "subway_station",
            Self::TrainStation => "train_station",
            Self::TransitStation => "transit_station",
            Self::PointOfInterest => "point_of_interest",
            Self::School => "school",
            Self::Hospital => "hospital",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("maps API key is not configured")]
    MissingCredential,
    #[error("maps provider responded with HTTP {status}")]
    Upstream { status: u16 },
    #[error("maps provider returned status {status}")]
    Status {
        status: String,
        message: Option<String>,
    },
    #[error("maps provider unreachable: {0}")]
    Transport(String),
    #[error("maps provider response could not be decoded: {0}")]
    Decode(String),
}

/// Mapping backend consulted by the geo proxy. `ZERO_RESULTS` style answers
/// come back as empty collections or `None`, not as errors.
#[async_trait]
pub trait MapsProvider: Send + Sync {
    fn has_credential(&self) -> bool;

    async fn autocomplete(&self, request: &AutocompleteRequest) -> Result<Vec<Value>, ProviderError>;

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, ProviderError>;

    /// Names of places of `category` around `origin`, nearest first.
    async fn nearby(
        &self,
        origin: Coordinates,
        category: NearbyCategory,
        radius_meters: u32,
    ) -> Result<Vec<String>, ProviderError>;

    async fn reverse_geocode(&self, origin: Coordinates) -> Result<Vec<GeocodeResult>, ProviderError>;
}
