//! Personalized match scoring for ranking search results.
//!
//! Weighted sum over independent signals, each contributing fixed design
//! points. Missing optional inputs contribute neutrally; scoring never
//! rejects a listing outright.

use super::domain::{PriceEstimate, PropertyListing, RentInputs, UserPreferences};
use super::insights::MarketInsight;
use super::pricing;
use serde::Serialize;
use std::cmp::Ordering;

const BUDGET_POINTS: f64 = 30.0;
const AMENITY_POINTS: f64 = 25.0;
const QUALITY_BONUS: f64 = 5.0;
const POPULARITY_POINTS: f64 = 10.0;

/// View counts saturate against this midpoint, keeping the popularity term
/// under its cap for any count.
const POPULARITY_MIDPOINT: f64 = 100.0;

const RECENT_YEAR_BUILT: u16 = 2015;
const QUALITY_AMENITY_COUNT: usize = 5;
const QUALITY_SQFT: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSignal {
    BudgetFit,
    AmenityOverlap,
    MarketPosition,
    Quality,
    Popularity,
}

/// Discrete contribution to a match score, kept so rankings are auditable.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponent {
    pub signal: ScoreSignal,
    pub points: f64,
    pub notes: String,
}

/// Asking rent relative to the bedroom-matched local average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    GoodValue,
    MarketRate,
    Premium,
}

impl MarketPosition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GoodValue => "good value",
            Self::MarketRate => "market rate",
            Self::Premium => "premium",
        }
    }

    const fn points(self) -> f64 {
        match self {
            Self::GoodValue => 20.0,
            Self::MarketRate => 12.0,
            Self::Premium => 4.0,
        }
    }

    fn classify(ratio: f64) -> Self {
        if ratio < 0.9 {
            Self::GoodValue
        } else if ratio <= 1.1 {
            Self::MarketRate
        } else {
            Self::Premium
        }
    }
}

/// A listing with its transient match score for one ranking pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredListing {
    pub listing: PropertyListing,
    /// Clamped to [0, 100].
    pub score: f64,
    pub effective_rent: Option<u32>,
    pub market_position: Option<MarketPosition>,
    pub components: Vec<ScoreComponent>,
}

/// Scores one listing against the renter's preferences and area insight.
pub fn score_listing(
    listing: &PropertyListing,
    preferences: &UserPreferences,
    insight: &MarketInsight,
) -> ScoredListing {
    let mut components = Vec::with_capacity(5);

    let effective_rent = effective_rent(listing);

    // Budget fit: binary by design, full credit at or under the ceiling.
    match (effective_rent, preferences.budget_max) {
        (Some(rent), Some(budget)) if rent <= budget => components.push(ScoreComponent {
            signal: ScoreSignal::BudgetFit,
            points: BUDGET_POINTS,
            notes: format!("rent {rent} within budget ceiling {budget}"),
        }),
        (Some(rent), Some(budget)) => components.push(ScoreComponent {
            signal: ScoreSignal::BudgetFit,
            points: 0.0,
            notes: format!("rent {rent} exceeds budget ceiling {budget}"),
        }),
        (None, Some(_)) => components.push(ScoreComponent {
            signal: ScoreSignal::BudgetFit,
            points: 0.0,
            notes: "no rent available to compare against budget".to_string(),
        }),
        (_, None) => components.push(ScoreComponent {
            signal: ScoreSignal::BudgetFit,
            points: 0.0,
            notes: "no budget ceiling stated".to_string(),
        }),
    }

    // Amenity overlap: proportional to the stated wishlist. An empty
    // wishlist earns nothing rather than free credit.
    if preferences.amenities.is_empty() {
        components.push(ScoreComponent {
            signal: ScoreSignal::AmenityOverlap,
            points: 0.0,
            notes: "no amenity preferences stated".to_string(),
        });
    } else {
        let matched = preferences
            .amenities
            .iter()
            .filter(|wanted| {
                listing
                    .amenities
                    .iter()
                    .any(|have| have.eq_ignore_ascii_case(wanted))
            })
            .count();
        let points = (matched as f64 / preferences.amenities.len() as f64) * AMENITY_POINTS;
        components.push(ScoreComponent {
            signal: ScoreSignal::AmenityOverlap,
            points,
            notes: format!(
                "{matched} of {} wanted amenities present",
                preferences.amenities.len()
            ),
        });
    }

    // Market position against the bedroom-matched local average.
    let market_position = market_position(listing, effective_rent, insight);
    match market_position {
        Some(position) => components.push(ScoreComponent {
            signal: ScoreSignal::MarketPosition,
            points: position.points(),
            notes: format!("{} for the local market", position.label()),
        }),
        None => components.push(ScoreComponent {
            signal: ScoreSignal::MarketPosition,
            points: 0.0,
            notes: "no local rent baseline for this bedroom count".to_string(),
        }),
    }

    // Quality signals: independent additive bonuses.
    let mut quality_points = 0.0;
    let mut quality_notes = Vec::new();
    if listing
        .year_built
        .is_some_and(|year| year >= RECENT_YEAR_BUILT)
    {
        quality_points += QUALITY_BONUS;
        quality_notes.push("recent construction");
    }
    if listing.amenities.len() >= QUALITY_AMENITY_COUNT {
        quality_points += QUALITY_BONUS;
        quality_notes.push("well amenitized");
    }
    if listing.square_footage.is_some_and(|sqft| sqft >= QUALITY_SQFT) {
        quality_points += QUALITY_BONUS;
        quality_notes.push("generous floor area");
    }
    components.push(ScoreComponent {
        signal: ScoreSignal::Quality,
        points: quality_points,
        notes: if quality_notes.is_empty() {
            "no quality bonuses".to_string()
        } else {
            quality_notes.join(", ")
        },
    });

    // Popularity: saturating curve over view count, capped under its weight.
    let views = listing.view_count.unwrap_or(0) as f64;
    let popularity_points = POPULARITY_POINTS * views / (views + POPULARITY_MIDPOINT);
    components.push(ScoreComponent {
        signal: ScoreSignal::Popularity,
        points: popularity_points,
        notes: format!("{} recorded views", views as u64),
    });

    let score = components
        .iter()
        .map(|component| component.points)
        .sum::<f64>()
        .clamp(0.0, 100.0);

    ScoredListing {
        listing: listing.clone(),
        score,
        effective_rent,
        market_position,
        components,
    }
}

/// Scores and orders candidates: best score first, newest listing first on
/// ties.
pub fn rank_listings(
    candidates: &[PropertyListing],
    preferences: &UserPreferences,
    insight: &MarketInsight,
) -> Vec<ScoredListing> {
    let mut scored: Vec<ScoredListing> = candidates
        .iter()
        .map(|listing| score_listing(listing, preferences, insight))
        .collect();

    scored.sort_by(ranking_order);
    scored
}

/// The one ranking order for scored listings: higher score first, then the
/// newer listing on equal scores. Callers sorting outside `rank_listings`
/// must use this too so result pages stay consistent.
pub fn ranking_order(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.listing.created_at.cmp(&a.listing.created_at))
}

/// Listed rent when present; otherwise the calculator's estimate. A listing
/// whose snapshot cannot be priced scores neutrally on rent-based terms.
fn effective_rent(listing: &PropertyListing) -> Option<u32> {
    listing.current_rent.or_else(|| {
        pricing::estimate_rent(&RentInputs::from_listing(listing))
            .ok()
            .map(|estimate: PriceEstimate| estimate.total_price)
    })
}

fn market_position(
    listing: &PropertyListing,
    effective_rent: Option<u32>,
    insight: &MarketInsight,
) -> Option<MarketPosition> {
    let rent = effective_rent?;
    let band = insight
        .metrics()
        .rent_bands
        .iter()
        .find(|band| band.bedrooms == listing.bedrooms)?;
    if band.average_rent == 0 {
        return None;
    }
    Some(MarketPosition::classify(
        rent as f64 / band.average_rent as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::{ListingStatus, PropertyType};
    use crate::engine::insights::{
        BedroomRentBand, InventoryLevel, MarketInsight, MarketMetrics, PriceTrend,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn listing(id: &str) -> PropertyListing {
        PropertyListing {
            id: id.to_string(),
            property_type: PropertyType::Apartment,
            bedrooms: 2,
            bathrooms: 1.0,
            square_footage: Some(900),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            amenities: BTreeSet::from(["parking".to_string(), "gym".to_string()]),
            current_rent: Some(28_000),
            status: ListingStatus::Active,
            year_built: Some(2020),
            view_count: Some(50),
            created_at: Utc
                .with_ymd_and_hms(2026, 8, 1, 10, 0, 0)
                .single()
                .expect("valid date"),
        }
    }

    fn insight_with_band(bedrooms: u8, average_rent: u32) -> MarketInsight {
        MarketInsight::Real(MarketMetrics {
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            rent_bands: vec![BedroomRentBand {
                bedrooms,
                average_rent,
                sample_size: 6,
            }],
            demand_score: 55,
            inventory: InventoryLevel::Balanced,
            trend: PriceTrend::Stable,
            sample_size: 6,
            recommendations: Vec::new(),
        })
    }

    fn preferences() -> UserPreferences {
        UserPreferences {
            budget_max: Some(30_000),
            amenities: BTreeSet::from(["parking".to_string(), "pool".to_string()]),
            ..UserPreferences::default()
        }
    }

    fn points_for(scored: &ScoredListing, signal: ScoreSignal) -> f64 {
        scored
            .components
            .iter()
            .find(|component| component.signal == signal)
            .map(|component| component.points)
            .expect("every signal contributes a component")
    }

    #[test]
    fn score_combines_all_signals() {
        let scored = score_listing(&listing("a"), &preferences(), &insight_with_band(2, 32_000));

        assert_eq!(points_for(&scored, ScoreSignal::BudgetFit), 30.0);
        // One of two wanted amenities present.
        assert_eq!(points_for(&scored, ScoreSignal::AmenityOverlap), 12.5);
        // 28000/32000 = 0.875 < 0.9, good value.
        assert_eq!(points_for(&scored, ScoreSignal::MarketPosition), 20.0);
        assert_eq!(scored.market_position, Some(MarketPosition::GoodValue));
        // Recent construction only.
        assert_eq!(points_for(&scored, ScoreSignal::Quality), 5.0);
        assert!(points_for(&scored, ScoreSignal::Popularity) > 0.0);
        assert!(scored.score > 0.0 && scored.score <= 100.0);
    }

    #[test]
    fn empty_amenity_preferences_earn_nothing() {
        let mut prefs = preferences();
        prefs.amenities.clear();
        let scored = score_listing(&listing("a"), &prefs, &insight_with_band(2, 32_000));
        assert_eq!(points_for(&scored, ScoreSignal::AmenityOverlap), 0.0);
    }

    #[test]
    fn budget_fit_is_binary() {
        let mut over_budget = listing("a");
        over_budget.current_rent = Some(30_001);
        let prefs = preferences();
        let scored = score_listing(&over_budget, &prefs, &insight_with_band(2, 32_000));
        assert_eq!(points_for(&scored, ScoreSignal::BudgetFit), 0.0);
    }

    #[test]
    fn unpriced_listing_uses_calculator_estimate() {
        let mut unpriced = listing("a");
        unpriced.current_rent = None;
        let scored = score_listing(
            &unpriced,
            &preferences(),
            &insight_with_band(2, 100_000_000),
        );
        // Pune 2-bed estimate lands well under the absurd baseline.
        assert!(scored.effective_rent.is_some());
        assert_eq!(scored.market_position, Some(MarketPosition::GoodValue));
    }

    #[test]
    fn missing_band_scores_market_neutrally() {
        let scored = score_listing(&listing("a"), &preferences(), &insight_with_band(3, 40_000));
        assert_eq!(points_for(&scored, ScoreSignal::MarketPosition), 0.0);
        assert_eq!(scored.market_position, None);
    }

    #[test]
    fn score_stays_in_bounds_for_extreme_listings() {
        let mut maxed = listing("a");
        maxed.amenities = BTreeSet::from([
            "parking".to_string(),
            "pool".to_string(),
            "gym".to_string(),
            "security".to_string(),
            "lift".to_string(),
            "garden".to_string(),
        ]);
        maxed.square_footage = Some(5_000);
        maxed.view_count = Some(u32::MAX);
        maxed.current_rent = Some(1);

        let prefs = UserPreferences {
            budget_max: Some(u32::MAX),
            amenities: BTreeSet::from(["parking".to_string(), "pool".to_string()]),
            ..UserPreferences::default()
        };

        let scored = score_listing(&maxed, &prefs, &insight_with_band(2, 32_000));
        assert!(scored.score <= 100.0);
        assert!(scored.score >= 0.0);
    }

    #[test]
    fn ties_break_by_newest_listing() {
        let older = listing("older");
        let mut newer = listing("newer");
        newer.created_at = Utc
            .with_ymd_and_hms(2026, 8, 15, 10, 0, 0)
            .single()
            .expect("valid date");

        let ranked = rank_listings(
            &[older, newer],
            &preferences(),
            &insight_with_band(2, 32_000),
        );
        assert_eq!(ranked[0].listing.id, "newer");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn ranking_order_prefers_score_then_recency() {
        let insight = insight_with_band(2, 32_000);
        let strong = score_listing(&listing("strong"), &preferences(), &insight);
        let mut weak = listing("weak");
        weak.current_rent = Some(45_000);
        let weak = score_listing(&weak, &preferences(), &insight);

        assert_eq!(ranking_order(&strong, &weak), Ordering::Less);
        assert_eq!(ranking_order(&weak, &strong), Ordering::Greater);

        let mut newer = listing("newer");
        newer.created_at = Utc
            .with_ymd_and_hms(2026, 8, 15, 10, 0, 0)
            .single()
            .expect("valid date");
        let tied_old = score_listing(&listing("older"), &preferences(), &insight);
        let tied_new = score_listing(&newer, &preferences(), &insight);
        assert_eq!(tied_old.score, tied_new.score);
        assert_eq!(ranking_order(&tied_new, &tied_old), Ordering::Less);
    }
}
