//! Geocoding proxy: place autocomplete, place details with nearby-amenity
//! enrichment, and reverse geocoding in front of Google Maps.

pub mod address;
mod google;
pub mod nearby;
pub mod provider;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use address::AddressBreakdown;
pub use google::GoogleMapsClient;
pub use nearby::{first_non_empty, NearbySettings};
pub use provider::{
    AddressComponent, AutocompleteRequest, Coordinates, GeocodeResult, MapsProvider,
    NearbyCategory, PlaceDetails, ProviderError,
};
pub use router::geo_router;
pub use service::{GeoError, GeoService, PlaceSummary};
