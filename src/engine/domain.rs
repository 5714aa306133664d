use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Townhouse,
    Studio,
    Loft,
    Villa,
    Penthouse,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Condo => "condo",
            Self::Townhouse => "townhouse",
            Self::Studio => "studio",
            Self::Loft => "loft",
            Self::Villa => "villa",
            Self::Penthouse => "penthouse",
        }
    }

    /// Case-insensitive match used by CSV import and API payloads.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apartment" | "flat" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "condo" | "condominium" => Some(Self::Condo),
            "townhouse" => Some(Self::Townhouse),
            "studio" => Some(Self::Studio),
            "loft" => Some(Self::Loft),
            "villa" => Some(Self::Villa),
            "penthouse" => Some(Self::Penthouse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Pending,
    Rented,
    Inactive,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Rented => "rented",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "rented" => Some(Self::Rented),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// A rentable property record as the engine consumes it. The listing store
/// owns persistence; the engine only ever reads snapshots of this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyListing {
    pub id: String,
    pub property_type: PropertyType,
    pub bedrooms: u8,
    pub bathrooms: f32,
    #[serde(default)]
    pub square_footage: Option<u32>,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    /// Listed monthly rent in INR. Absent for listings still being priced;
    /// the rent calculator supplies an estimate at read time.
    #[serde(default)]
    pub current_rent: Option<u32>,
    pub status: ListingStatus,
    #[serde(default)]
    pub year_built: Option<u16>,
    #[serde(default)]
    pub view_count: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Inputs to the rent calculator. Categorical fields stay as free text so
/// unknown values can degrade to documented defaults instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentInputs {
    pub property_type: String,
    #[serde(default)]
    pub bedrooms: u8,
    #[serde(default = "default_bathrooms")]
    pub bathrooms: f32,
    #[serde(default)]
    pub square_footage: Option<u32>,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
}

fn default_bathrooms() -> f32 {
    1.0
}

impl RentInputs {
    pub fn from_listing(listing: &PropertyListing) -> Self {
        Self {
            property_type: listing.property_type.label().to_string(),
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            square_footage: listing.square_footage,
            city: listing.city.clone(),
            state: listing.state.clone(),
            amenities: listing.amenities.clone(),
        }
    }
}

/// Calculator output. All money fields are rounded integer INR per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub base_price: u32,
    pub amenities_value: u32,
    pub total_price: u32,
    pub price_range_min: u32,
    pub price_range_max: u32,
    pub location_multiplier: f64,
    pub bedroom_multiplier: f64,
    pub bathroom_multiplier: f64,
}

/// Structured filters feeding the listing store query, either entered
/// directly or extracted from a free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.max_rent.is_none() && self.bedrooms.is_none() && self.city.is_none()
    }
}

/// Renter preferences supplied by the preference store, read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub budget_min: Option<u32>,
    #[serde(default)]
    pub budget_max: Option<u32>,
    #[serde(default)]
    pub bedrooms_min: Option<u8>,
    #[serde(default)]
    pub bedrooms_max: Option<u8>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
}

/// Raised only for malformed numeric inputs where a real price must be
/// produced. Categorical lookup misses never reach this path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidPropertyData {
    #[error("bathrooms must be a finite non-negative number, got {0}")]
    Bathrooms(f32),
    #[error("square footage must be between 1 and 1,000,000 square feet, got {0}")]
    SquareFootage(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_labels_round_trip() {
        for property_type in [
            PropertyType::Apartment,
            PropertyType::House,
            PropertyType::Condo,
            PropertyType::Townhouse,
            PropertyType::Studio,
            PropertyType::Loft,
            PropertyType::Villa,
            PropertyType::Penthouse,
        ] {
            assert_eq!(
                PropertyType::from_label(property_type.label()),
                Some(property_type)
            );
        }
    }

    #[test]
    fn property_type_lookup_is_case_insensitive() {
        assert_eq!(
            PropertyType::from_label("  PentHouse "),
            Some(PropertyType::Penthouse)
        );
        assert_eq!(PropertyType::from_label("castle"), None);
    }

    #[test]
    fn empty_filters_report_empty() {
        assert!(SearchFilters::default().is_empty());
        let filters = SearchFilters {
            bedrooms: Some(2),
            ..SearchFilters::default()
        };
        assert!(!filters.is_empty());
    }
}
