//! Qualitative market insight for a city/state area.
//!
//! Real aggregates are preferred whenever enough priced listings exist for
//! the area. Below the configured sample floor the generator falls back to
//! seeded synthetic numbers, and the result is tagged so callers can never
//! confuse the two. Randomness is always injected by the caller.

use super::domain::{ListingStatus, PropertyListing};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryLevel {
    Low,
    Balanced,
    High,
}

impl InventoryLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Balanced => "balanced",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Rising,
    Stable,
    Cooling,
}

impl PriceTrend {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Stable => "stable",
            Self::Cooling => "cooling",
        }
    }
}

/// Average asking rent for one bedroom count within the area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BedroomRentBand {
    pub bedrooms: u8,
    pub average_rent: u32,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketMetrics {
    pub city: String,
    pub state: String,
    pub rent_bands: Vec<BedroomRentBand>,
    /// 0-100, higher means renters compete harder for stock.
    pub demand_score: u8,
    pub inventory: InventoryLevel,
    pub trend: PriceTrend,
    /// Priced listings the numbers were derived from (or would have been,
    /// on the synthetic path).
    pub sample_size: usize,
    /// Rule-matched guidance, strongest signal first.
    pub recommendations: Vec<String>,
}

/// Insight tagged by provenance. The tag is a hard contract: estimated
/// numbers must never be presented to end users as observed market data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MarketInsight {
    Real(MarketMetrics),
    Estimated(MarketMetrics),
}

impl MarketInsight {
    pub fn is_estimate(&self) -> bool {
        matches!(self, Self::Estimated(_))
    }

    pub fn metrics(&self) -> &MarketMetrics {
        match self {
            Self::Real(metrics) | Self::Estimated(metrics) => metrics,
        }
    }
}

/// Builds insight for an area from the listings the caller already fetched.
/// `min_sample` is the smallest priced-listing count trusted for real
/// aggregates; under it the seeded placeholder path is used.
pub fn market_insight(
    city: &str,
    state: &str,
    listings: &[PropertyListing],
    min_sample: usize,
    rng: &mut impl Rng,
) -> MarketInsight {
    let matching: Vec<&PropertyListing> = listings
        .iter()
        .filter(|listing| {
            listing.city.eq_ignore_ascii_case(city.trim())
                && listing.state.eq_ignore_ascii_case(state.trim())
        })
        .collect();

    let priced: Vec<&PropertyListing> = matching
        .iter()
        .copied()
        .filter(|listing| listing.current_rent.is_some())
        .collect();

    if priced.len() >= min_sample.max(1) {
        MarketInsight::Real(real_metrics(city, state, &matching, &priced, min_sample))
    } else {
        MarketInsight::Estimated(synthetic_metrics(city, state, priced.len(), rng))
    }
}

fn real_metrics(
    city: &str,
    state: &str,
    matching: &[&PropertyListing],
    priced: &[&PropertyListing],
    min_sample: usize,
) -> MarketMetrics {
    let mut per_bedroom: BTreeMap<u8, (u64, usize)> = BTreeMap::new();
    for listing in priced {
        if let Some(rent) = listing.current_rent {
            let entry = per_bedroom.entry(listing.bedrooms).or_insert((0, 0));
            entry.0 += rent as u64;
            entry.1 += 1;
        }
    }

    let rent_bands: Vec<BedroomRentBand> = per_bedroom
        .into_iter()
        .map(|(bedrooms, (sum, count))| BedroomRentBand {
            bedrooms,
            average_rent: (sum / count as u64) as u32,
            sample_size: count,
        })
        .collect();

    let active = matching
        .iter()
        .filter(|listing| listing.status == ListingStatus::Active)
        .count();
    let off_market = matching.len() - active;
    let demand_score = if matching.is_empty() {
        0
    } else {
        ((off_market as f64 / matching.len() as f64) * 100.0).round() as u8
    };

    let inventory = if active <= min_sample {
        InventoryLevel::Low
    } else if active <= min_sample * 3 {
        InventoryLevel::Balanced
    } else {
        InventoryLevel::High
    };

    let trend = price_trend(priced);

    let mut metrics = MarketMetrics {
        city: city.trim().to_string(),
        state: state.trim().to_string(),
        rent_bands,
        demand_score,
        inventory,
        trend,
        sample_size: priced.len(),
        recommendations: Vec::new(),
    };
    metrics.recommendations = recommendations_for(&metrics);
    metrics
}

/// Compares average asking rent of the newer half of the sample against the
/// older half. Small samples read as stable.
fn price_trend(priced: &[&PropertyListing]) -> PriceTrend {
    if priced.len() < 4 {
        return PriceTrend::Stable;
    }

    let mut by_age: Vec<&PropertyListing> = priced.to_vec();
    by_age.sort_by_key(|listing| listing.created_at);
    let split = by_age.len() / 2;

    let older = average_rent(&by_age[..split]);
    let newer = average_rent(&by_age[split..]);
    let (Some(older), Some(newer)) = (older, newer) else {
        return PriceTrend::Stable;
    };

    let ratio = newer / older;
    if ratio > 1.05 {
        PriceTrend::Rising
    } else if ratio < 0.95 {
        PriceTrend::Cooling
    } else {
        PriceTrend::Stable
    }
}

fn average_rent(listings: &[&PropertyListing]) -> Option<f64> {
    let rents: Vec<u32> = listings.iter().filter_map(|l| l.current_rent).collect();
    if rents.is_empty() {
        return None;
    }
    Some(rents.iter().map(|rent| *rent as f64).sum::<f64>() / rents.len() as f64)
}

/// Placeholder metrics for thin areas. Internally consistent by
/// construction: rent bands grow monotonically with bedroom count and the
/// inventory/trend labels agree with the drawn demand score.
fn synthetic_metrics(
    city: &str,
    state: &str,
    observed_sample: usize,
    rng: &mut impl Rng,
) -> MarketMetrics {
    let mut rent_bands = Vec::with_capacity(4);
    let mut band = rng.gen_range(15_000..=30_000) as f64;
    for bedrooms in 1..=4u8 {
        rent_bands.push(BedroomRentBand {
            bedrooms,
            average_rent: (band / 100.0).round() as u32 * 100,
            sample_size: 0,
        });
        band *= rng.gen_range(1.25..1.45);
    }

    let demand_score = rng.gen_range(35..=85u8);
    let inventory = if demand_score >= 65 {
        InventoryLevel::Low
    } else if demand_score >= 45 {
        InventoryLevel::Balanced
    } else {
        InventoryLevel::High
    };
    let trend = if demand_score >= 70 {
        PriceTrend::Rising
    } else if demand_score <= 45 {
        PriceTrend::Cooling
    } else {
        PriceTrend::Stable
    };

    let mut metrics = MarketMetrics {
        city: city.trim().to_string(),
        state: state.trim().to_string(),
        rent_bands,
        demand_score,
        inventory,
        trend,
        sample_size: observed_sample,
        recommendations: Vec::new(),
    };
    metrics.recommendations = recommendations_for(&metrics);
    metrics
}

fn recommendations_for(metrics: &MarketMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    match metrics.inventory {
        InventoryLevel::Low => recommendations.push(format!(
            "Inventory is tight in {}; landlords can hold firm on asking rents",
            metrics.city
        )),
        InventoryLevel::High => recommendations.push(format!(
            "Plenty of competing stock in {}; price near the band midpoint and respond to inquiries quickly",
            metrics.city
        )),
        InventoryLevel::Balanced => {}
    }

    match metrics.trend {
        PriceTrend::Rising => recommendations.push(
            "Rents are trending up; revisit pricing at renewal before locking long leases"
                .to_string(),
        ),
        PriceTrend::Cooling => recommendations.push(
            "Rents are cooling; small concessions beat headline price cuts".to_string(),
        ),
        PriceTrend::Stable => {}
    }

    if metrics.demand_score >= 70 {
        recommendations.push(
            "Demand is strong; expect short vacancy windows and screen applicants promptly"
                .to_string(),
        );
    } else if metrics.demand_score <= 40 {
        recommendations.push(
            "Demand is soft; invest in photos and amenity callouts to stand out".to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations
            .push("Market looks balanced; price within the recommended range".to_string());
    }

    recommendations
}
