//! Flattens provider address components into the marketplace's address shape.
//!
//! Each field is resolved through an ordered chain of component type tags; the
//! first component carrying a tag wins.

use serde::Serialize;

use super::provider::{AddressComponent, Coordinates};

pub const CITY_CHAIN: &[&str] = &["locality", "administrative_area_level_2"];
pub const SUB_LOCALITY_CHAIN: &[&str] = &[
    "sublocality_level_1",
    "sublocality",
    "administrative_area_level_3",
];
pub const LOCALITY_CHAIN: &[&str] = &["sublocality_level_2", "neighborhood", "sublocality_level_1"];
pub const STATE_CHAIN: &[&str] = &["administrative_area_level_1"];
pub const POSTAL_CODE_CHAIN: &[&str] = &["postal_code"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBreakdown {
    pub formatted_address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub sub_locality: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressBreakdown {
    pub fn from_components(
        formatted_address: Option<String>,
        location: Option<Coordinates>,
        components: &[AddressComponent],
    ) -> Self {
        Self {
            formatted_address,
            lat: location.map(|point| point.lat),
            lng: location.map(|point| point.lng),
            city: pick(components, CITY_CHAIN),
            sub_locality: pick(components, SUB_LOCALITY_CHAIN),
            locality: pick(components, LOCALITY_CHAIN),
            state: pick(components, STATE_CHAIN),
            postal_code: pick(components, POSTAL_CODE_CHAIN),
        }
    }

    /// Neighbourhood names already known from the address itself.
    pub fn hints(&self) -> Vec<String> {
        [&self.sub_locality, &self.locality]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

pub fn pick(components: &[AddressComponent], chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|tag| {
        components
            .iter()
            .find(|component| component.has_type(tag))
            .map(|component| component.long_name.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}

/// Area name embedded in a plus code compound string: the text between the
/// code and the first comma (`"WJQ6+XX Koramangala, Bengaluru"` gives
/// `Koramangala`).
pub fn plus_code_area(compound_code: &str) -> Option<String> {
    let (_, rest) = compound_code.trim().split_once(' ')?;
    let area = rest.split(',').next()?.trim();
    (!area.is_empty()).then(|| area.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: name.to_string(),
            short_name: name.to_string(),
            types: types.iter().map(|tag| tag.to_string()).collect(),
        }
    }

    #[test]
    fn city_falls_back_to_district() {
        let components = vec![
            component("Haveli", &["administrative_area_level_2", "political"]),
            component("Maharashtra", &["administrative_area_level_1", "political"]),
        ];
        let address = AddressBreakdown::from_components(None, None, &components);
        assert_eq!(address.city.as_deref(), Some("Haveli"));
        assert_eq!(address.state.as_deref(), Some("Maharashtra"));
    }

    #[test]
    fn chain_order_beats_component_order() {
        let components = vec![
            component("Pune District", &["administrative_area_level_2"]),
            component("Pune", &["locality", "political"]),
            component("Kothrud", &["sublocality", "political"]),
            component("Ideal Colony", &["sublocality_level_1", "sublocality"]),
        ];
        let address = AddressBreakdown::from_components(None, None, &components);
        assert_eq!(address.city.as_deref(), Some("Pune"));
        assert_eq!(address.sub_locality.as_deref(), Some("Ideal Colony"));
        assert_eq!(address.locality.as_deref(), Some("Ideal Colony"));
    }

    #[test]
    fn sub_locality_uses_admin_level_three_last() {
        let components = vec![
            component("411038", &["postal_code"]),
            component("Taluka Haveli", &["administrative_area_level_3"]),
        ];
        let address = AddressBreakdown::from_components(None, None, &components);
        assert_eq!(address.sub_locality.as_deref(), Some("Taluka Haveli"));
        assert_eq!(address.postal_code.as_deref(), Some("411038"));
        assert_eq!(address.locality, None);
    }

    #[test]
    fn plus_code_area_is_text_before_first_comma() {
        assert_eq!(
            plus_code_area("WJQ6+XX Koramangala, Bengaluru, Karnataka, India").as_deref(),
            Some("Koramangala")
        );
        assert_eq!(plus_code_area("WJQ6+XX"), None);
        assert_eq!(plus_code_area("WJQ6+XX  , Bengaluru"), None);
    }

    #[test]
    fn serializes_camel_case() {
        let address = AddressBreakdown {
            sub_locality: Some("Baner".to_string()),
            ..AddressBreakdown::default()
        };
        let encoded = serde_json::to_value(&address).expect("encodes");
        assert_eq!(encoded["subLocality"], "Baner");
        assert!(encoded["postalCode"].is_null());
    }
}
