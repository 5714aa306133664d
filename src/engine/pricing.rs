use super::domain::{InvalidPropertyData, PriceEstimate, RentInputs};
use super::market;

/// Width of the quoted range around the recommended rent, in percent.
const RANGE_MARGIN_PCT: u64 = 15;

/// Computes a recommended monthly rent and a ±15% range for a property.
///
/// Pure function of its inputs and the static market tables: identical
/// inputs always produce identical output. Unknown property types, cities,
/// states, and amenity tags degrade to documented defaults; only malformed
/// numerics are rejected.
pub fn estimate_rent(inputs: &RentInputs) -> Result<PriceEstimate, InvalidPropertyData> {
    if !inputs.bathrooms.is_finite() || inputs.bathrooms < 0.0 {
        return Err(InvalidPropertyData::Bathrooms(inputs.bathrooms));
    }
    if let Some(area) = inputs.square_footage {
        if area == 0 || area > market::MAX_AREA_SQFT {
            return Err(InvalidPropertyData::SquareFootage(area));
        }
    }

    let per_sqft = market::base_price_per_sqft(&inputs.property_type);
    let area = inputs.square_footage.unwrap_or(market::DEFAULT_AREA_SQFT) as f64;
    let location_multiplier = market::location_multiplier(&inputs.city, &inputs.state);
    let bedroom_multiplier = market::bedroom_multiplier(inputs.bedrooms);
    let bathroom_multiplier = market::bathroom_multiplier(inputs.bathrooms);

    let base_price =
        (per_sqft * area * location_multiplier * bedroom_multiplier * bathroom_multiplier).round()
            as u32;

    let amenities_value: u32 = inputs
        .amenities
        .iter()
        .map(|tag| market::amenity_value(tag))
        .sum();

    let total_price = base_price + amenities_value;

    // Integer margin arithmetic keeps the range deterministic and symmetric.
    let margin = ((total_price as u64 * RANGE_MARGIN_PCT + 50) / 100) as u32;
    let price_range_min = total_price.saturating_sub(margin);
    let price_range_max = total_price + margin;

    Ok(PriceEstimate {
        base_price,
        amenities_value,
        total_price,
        price_range_min,
        price_range_max,
        location_multiplier,
        bedroom_multiplier,
        bathroom_multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn mumbai_two_bed() -> RentInputs {
        RentInputs {
            property_type: "apartment".to_string(),
            bedrooms: 2,
            bathrooms: 1.0,
            square_footage: Some(900),
            city: "mumbai".to_string(),
            state: "maharashtra".to_string(),
            amenities: BTreeSet::from(["parking".to_string(), "gym".to_string()]),
        }
    }

    #[test]
    fn mumbai_reference_estimate() {
        let estimate = estimate_rent(&mumbai_two_bed()).expect("valid inputs price");

        // 35/sqft x 900 x 1.8 (mumbai) x 1.3 (2 bed) x 1.0 (1 bath)
        assert_eq!(estimate.base_price, 73_710);
        assert_eq!(estimate.amenities_value, 2_500);
        assert_eq!(estimate.total_price, 76_210);
        assert_eq!(estimate.location_multiplier, 1.8);
        assert_eq!(estimate.bedroom_multiplier, 1.3);
        assert_eq!(estimate.bathroom_multiplier, 1.0);
        assert_eq!(estimate.price_range_min, 64_778);
        assert_eq!(estimate.price_range_max, 87_642);
    }

    #[test]
    fn estimate_is_idempotent() {
        let inputs = mumbai_two_bed();
        let first = estimate_rent(&inputs).expect("first call prices");
        let second = estimate_rent(&inputs).expect("second call prices");
        assert_eq!(first, second);
    }

    #[test]
    fn range_brackets_total() {
        let estimate = estimate_rent(&mumbai_two_bed()).expect("valid inputs price");
        assert!(estimate.price_range_min <= estimate.total_price);
        assert!(estimate.total_price <= estimate.price_range_max);
    }

    #[test]
    fn unknown_categoricals_degrade_without_failing() {
        let inputs = RentInputs {
            property_type: "castle".to_string(),
            bedrooms: 7,
            bathrooms: 1.0,
            square_footage: None,
            city: "atlantis".to_string(),
            state: "nowhere".to_string(),
            amenities: BTreeSet::from(["moat".to_string()]),
        };

        let estimate = estimate_rent(&inputs).expect("unknown lookups default");
        // Default rate, default 1000 sqft, all multipliers neutral.
        assert_eq!(estimate.base_price, 35_000);
        assert_eq!(estimate.amenities_value, 0);
        assert!(estimate.total_price > 0);
    }

    #[test]
    fn malformed_bathrooms_are_rejected() {
        let mut inputs = mumbai_two_bed();
        inputs.bathrooms = f32::NAN;
        assert!(matches!(
            estimate_rent(&inputs),
            Err(InvalidPropertyData::Bathrooms(_))
        ));

        inputs.bathrooms = -1.0;
        assert!(matches!(
            estimate_rent(&inputs),
            Err(InvalidPropertyData::Bathrooms(_))
        ));
    }

    #[test]
    fn zero_square_footage_is_rejected() {
        let mut inputs = mumbai_two_bed();
        inputs.square_footage = Some(0);
        assert_eq!(
            estimate_rent(&inputs),
            Err(InvalidPropertyData::SquareFootage(0))
        );
    }

    #[test]
    fn oversized_square_footage_is_rejected_not_overflowed() {
        let mut inputs = mumbai_two_bed();
        for area in [market::MAX_AREA_SQFT + 1, u32::MAX] {
            inputs.square_footage = Some(area);
            assert_eq!(
                estimate_rent(&inputs),
                Err(InvalidPropertyData::SquareFootage(area))
            );
        }
    }

    #[test]
    fn largest_accepted_area_keeps_the_range_ordered() {
        let inputs = RentInputs {
            property_type: "penthouse".to_string(),
            bedrooms: 5,
            bathrooms: 4.0,
            square_footage: Some(market::MAX_AREA_SQFT),
            city: "mumbai".to_string(),
            state: "maharashtra".to_string(),
            amenities: BTreeSet::from(["furnished".to_string(), "pool".to_string()]),
        };

        let estimate = estimate_rent(&inputs).expect("capped area prices");
        assert!(estimate.price_range_min <= estimate.total_price);
        assert!(estimate.total_price <= estimate.price_range_max);
        assert!(estimate.total_price > estimate.base_price);
    }
}
