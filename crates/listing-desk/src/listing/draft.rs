use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::fields::{
    AvailabilityStatus, Furnishing, ListingType, PriceType, PropertyCategory, PropertyType,
    PublishStatus,
};
use super::value::{self, DraftValue, Record};

/// Top-level sections every listing draft carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftSection {
    Context,
    Location,
    Details,
    Pricing,
    Availability,
    Amenities,
    Meta,
    Media,
    PublishOptions,
}

impl DraftSection {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Context,
            Self::Location,
            Self::Details,
            Self::Pricing,
            Self::Availability,
            Self::Amenities,
            Self::Meta,
            Self::Media,
            Self::PublishOptions,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Location => "location",
            Self::Details => "details",
            Self::Pricing => "pricing",
            Self::Availability => "availability",
            Self::Amenities => "amenities",
            Self::Meta => "meta",
            Self::Media => "media",
            Self::PublishOptions => "publishOptions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("listing draft must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn record_from_json(value: Value) -> Result<Record, DraftError> {
    let kind = json_kind(&value);
    DraftValue::from(value)
        .into_record()
        .ok_or(DraftError::NotAnObject(kind))
}

/// The in-progress listing form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingDraft(Record);

impl ListingDraft {
    /// Compiled-in starting point for a new listing.
    pub fn skeleton() -> Self {
        let skeleton = json!({
            "context": {
                "listingType": ListingType::Sale.as_str(),
                "category": PropertyCategory::Residential.as_str(),
                "propertyType": PropertyType::Apartment.as_str(),
            },
            "location": {},
            "details": {},
            "pricing": {
                "priceType": PriceType::Fixed.as_str(),
                "negotiable": false,
            },
            "availability": {
                "status": AvailabilityStatus::ReadyToMove.as_str(),
            },
            "amenities": {
                "furnishing": Furnishing::Unfurnished.as_str(),
                "parking": [],
                "approvals": [],
            },
            "meta": {},
            "media": {
                "imageIds": [],
                "videoIds": [],
                "documentIds": [],
            },
            "publishOptions": {
                "status": PublishStatus::Draft.as_str(),
            },
        });

        Self(DraftValue::from(skeleton).into_record().unwrap_or_default())
    }

    pub fn from_json(value: Value) -> Result<Self, DraftError> {
        record_from_json(value).map(Self)
    }

    pub fn from_record(record: Record) -> Self {
        Self(record)
    }

    pub fn as_record(&self) -> &Record {
        &self.0
    }

    pub fn to_json(&self) -> Value {
        Value::from(DraftValue::Record(self.0.clone()))
    }

    pub fn get(&self, path: &str) -> Option<&DraftValue> {
        value::lookup(&self.0, path)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(DraftValue::as_str)
    }

    pub fn section(&self, section: DraftSection) -> Option<&Record> {
        self.0.get(section.key()).and_then(DraftValue::as_record)
    }

    pub fn merged(&self, patch: &DraftPatch) -> Self {
        Self(value::merge(&self.0, &patch.0))
    }
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self::skeleton()
    }
}

/// A partial listing produced by a wizard step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftPatch(Record);

impl DraftPatch {
    pub fn from_json(value: Value) -> Result<Self, DraftError> {
        record_from_json(value).map(Self)
    }

    /// Patch touching a single section; `fields` must be a JSON object.
    pub fn section(section: DraftSection, fields: Value) -> Result<Self, DraftError> {
        let fields = record_from_json(fields)?;
        let mut record = Record::new();
        record.insert(section.key().to_string(), DraftValue::Record(fields));
        Ok(Self(record))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_record(&self) -> &Record {
        &self.0
    }
}
