//! Fixed string sets accepted by enumerated listing fields.

use serde::{Deserialize, Serialize};

macro_rules! listing_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            pub const WIRE_VALUES: &'static [&'static str] = &[$($wire),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

listing_enum! {
    ListingType {
        Sale => "SALE",
        Rent => "RENT",
        Lease => "LEASE",
    }
}

listing_enum! {
    PropertyCategory {
        Residential => "RESIDENTIAL",
        Commercial => "COMMERCIAL",
        Agricultural => "AGRICULTURAL",
    }
}

listing_enum! {
    PropertyType {
        Apartment => "APARTMENT",
        IndependentHouse => "INDEPENDENT_HOUSE",
        Villa => "VILLA",
        Plot => "PLOT",
        Office => "OFFICE",
        Shop => "SHOP",
        Warehouse => "WAREHOUSE",
        Farmland => "FARMLAND",
    }
}

listing_enum! {
    PriceType {
        Fixed => "FIXED",
        PerSqft => "PER_SQFT",
    }
}

listing_enum! {
    AvailabilityStatus {
        ReadyToMove => "READY_TO_MOVE",
        UnderConstruction => "UNDER_CONSTRUCTION",
    }
}

listing_enum! {
    Furnishing {
        Unfurnished => "UNFURNISHED",
        SemiFurnished => "SEMI_FURNISHED",
        FullyFurnished => "FULLY_FURNISHED",
    }
}

listing_enum! {
    PublishStatus {
        Draft => "DRAFT",
        Published => "PUBLISHED",
    }
}

/// Draft paths holding enumerated values, with the wire values they accept.
pub const ENUMERATED_PATHS: &[(&str, &[&str])] = &[
    ("context.listingType", ListingType::WIRE_VALUES),
    ("context.category", PropertyCategory::WIRE_VALUES),
    ("context.propertyType", PropertyType::WIRE_VALUES),
    ("pricing.priceType", PriceType::WIRE_VALUES),
    ("availability.status", AvailabilityStatus::WIRE_VALUES),
    ("amenities.furnishing", Furnishing::WIRE_VALUES),
    ("publishOptions.status", PublishStatus::WIRE_VALUES),
];
