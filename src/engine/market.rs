//! Static market lookup tables, INR-denominated throughout.
//!
//! Every lookup degrades to a documented default for unknown keys; nothing
//! in this module can fail or produce a zero/negative factor.

/// Monthly base price per square foot by property type.
const BASE_PRICE_PER_SQFT: [(&str, f64); 8] = [
    ("apartment", 35.0),
    ("house", 30.0),
    ("condo", 40.0),
    ("townhouse", 32.0),
    ("studio", 45.0),
    ("loft", 42.0),
    ("villa", 50.0),
    ("penthouse", 60.0),
];

pub(crate) const DEFAULT_BASE_PRICE_PER_SQFT: f64 = 35.0;

/// Assumed floor area when a listing omits square footage.
pub(crate) const DEFAULT_AREA_SQFT: u32 = 1000;

/// Largest floor area the calculator accepts. The cap keeps the worst-case
/// price (highest rate and multipliers, plus the 15% band) inside `u32`.
pub(crate) const MAX_AREA_SQFT: u32 = 1_000_000;

/// No location, however small the market, prices below this factor.
pub(crate) const LOCATION_MULTIPLIER_FLOOR: f64 = 0.8;

const CITY_MULTIPLIERS: [(&str, f64); 13] = [
    ("mumbai", 1.8),
    ("delhi", 1.6),
    ("bangalore", 1.5),
    ("bengaluru", 1.5),
    ("gurgaon", 1.45),
    ("pune", 1.3),
    ("hyderabad", 1.25),
    ("chennai", 1.2),
    ("noida", 1.15),
    ("kolkata", 1.1),
    ("ahmedabad", 1.0),
    ("jaipur", 0.95),
    ("indore", 0.75),
];

const STATE_MULTIPLIERS: [(&str, f64); 10] = [
    ("maharashtra", 1.4),
    ("delhi", 1.6),
    ("karnataka", 1.3),
    ("haryana", 1.2),
    ("telangana", 1.15),
    ("tamil nadu", 1.1),
    ("west bengal", 1.05),
    ("gujarat", 1.0),
    ("uttar pradesh", 0.95),
    ("madhya pradesh", 0.7),
];

/// Step table keyed by bedroom count; unlisted counts fall back to 1.0.
const BEDROOM_MULTIPLIERS: [(u8, f64); 5] = [(1, 1.0), (2, 1.3), (3, 1.6), (4, 1.9), (5, 2.2)];

const BATHROOM_MULTIPLIERS: [(u8, f64); 4] = [(1, 1.0), (2, 1.1), (3, 1.2), (4, 1.3)];

/// Flat monthly value added per amenity tag; unknown tags contribute 0.
const AMENITY_VALUES: [(&str, u32); 20] = [
    ("parking", 1000),
    ("gym", 1500),
    ("pool", 2000),
    ("swimming pool", 2000),
    ("security", 800),
    ("lift", 500),
    ("elevator", 500),
    ("power backup", 700),
    ("furnished", 3000),
    ("semi furnished", 1500),
    ("ac", 1200),
    ("air conditioning", 1200),
    ("balcony", 600),
    ("garden", 900),
    ("wifi", 500),
    ("internet", 500),
    ("clubhouse", 1000),
    ("modular kitchen", 1100),
    ("gated community", 900),
    ("pet friendly", 400),
];

pub(crate) fn base_price_per_sqft(property_type: &str) -> f64 {
    let key = property_type.trim().to_ascii_lowercase();
    BASE_PRICE_PER_SQFT
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_BASE_PRICE_PER_SQFT)
}

/// Best of the city and state factors, floored so unknown or depressed
/// markets never collapse the price. Unmatched names count as 1.0.
pub(crate) fn location_multiplier(city: &str, state: &str) -> f64 {
    let city_key = city.trim().to_ascii_lowercase();
    let state_key = state.trim().to_ascii_lowercase();

    let city_factor = CITY_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == city_key)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0);
    let state_factor = STATE_MULTIPLIERS
        .iter()
        .find(|(name, _)| *name == state_key)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0);

    city_factor.max(state_factor).max(LOCATION_MULTIPLIER_FLOOR)
}

pub(crate) fn bedroom_multiplier(bedrooms: u8) -> f64 {
    BEDROOM_MULTIPLIERS
        .iter()
        .find(|(count, _)| *count == bedrooms)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

/// Keyed by whole bathrooms; half baths round down to the step below.
pub(crate) fn bathroom_multiplier(bathrooms: f32) -> f64 {
    let key = bathrooms as u8;
    BATHROOM_MULTIPLIERS
        .iter()
        .find(|(count, _)| *count == key)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

pub(crate) fn amenity_value(tag: &str) -> u32 {
    let key = tag.trim().to_ascii_lowercase();
    AMENITY_VALUES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
        .unwrap_or(0)
}
