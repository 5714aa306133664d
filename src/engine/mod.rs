pub mod catalog;
pub mod domain;
pub mod insights;
mod market;
pub mod pricing;
pub mod query;
pub mod scoring;

pub use catalog::{load_listings, sample_listings, CatalogError, CatalogImport};
pub use domain::{
    InvalidPropertyData, ListingStatus, PriceEstimate, PropertyListing, PropertyType, RentInputs,
    SearchFilters, UserPreferences,
};
pub use insights::{market_insight, InventoryLevel, MarketInsight, MarketMetrics, PriceTrend};
pub use pricing::estimate_rent;
pub use query::parse_query;
pub use scoring::{
    rank_listings, ranking_order, score_listing, MarketPosition, ScoreComponent, ScoredListing,
};
