use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rentscope::config::AppConfig;
use rentscope::engine::{
    estimate_rent, load_listings, market_insight, parse_query, ranking_order, sample_listings,
    score_listing, ListingStatus, MarketInsight, PriceEstimate, PropertyListing, RentInputs,
    ScoredListing, SearchFilters, UserPreferences,
};
use rentscope::error::AppError;
use rentscope::telemetry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    catalog: Arc<Vec<PropertyListing>>,
    min_market_sample: usize,
}

#[derive(Parser, Debug)]
#[command(
    name = "rentscope",
    about = "Pricing and personalized ranking engine for rental listings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute a rent estimate for one property
    Estimate(EstimateArgs),
    /// Parse a search, rank the catalog, and print the results
    Search(SearchArgs),
    /// Print market insight for a city/state area
    Insight(InsightArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Listing catalog CSV; the built-in sample catalog is used when absent
    #[arg(long)]
    listings_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Property type (apartment, house, condo, ...)
    #[arg(long)]
    property_type: String,
    #[arg(long, default_value_t = 1)]
    bedrooms: u8,
    #[arg(long, default_value_t = 1.0)]
    bathrooms: f32,
    /// Floor area in square feet (defaults to the market assumption)
    #[arg(long)]
    square_footage: Option<u32>,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    /// Amenity tag, repeatable
    #[arg(long = "amenity")]
    amenities: Vec<String>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Free-text search, e.g. "2 bedroom apartment in Pune under 40000"
    #[arg(long)]
    query: String,
    /// Listing catalog CSV; the built-in sample catalog is used when absent
    #[arg(long)]
    listings_csv: Option<PathBuf>,
    /// Budget ceiling used for match scoring
    #[arg(long)]
    budget_max: Option<u32>,
    /// Preferred amenity tag, repeatable
    #[arg(long = "amenity")]
    amenities: Vec<String>,
    /// Maximum results to print
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Args, Debug)]
struct InsightArgs {
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    /// Listing catalog CSV; the built-in sample catalog is used when absent
    #[arg(long)]
    listings_csv: Option<PathBuf>,
    /// Seed for the synthetic fallback path (defaults to an area-derived seed)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    /// Free-text search; parsed when structured filters are not supplied.
    #[serde(default)]
    query: Option<String>,
    /// Structured filters; fields set here win over parsed ones.
    #[serde(default)]
    filters: Option<SearchFilters>,
    #[serde(default)]
    preferences: Option<UserPreferences>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    filters: SearchFilters,
    total_matches: usize,
    results: Vec<ScoredListing>,
}

#[derive(Debug, Deserialize)]
struct InsightRequest {
    city: String,
    state: String,
    /// Overrides the area-derived seed for the synthetic fallback path.
    #[serde(default)]
    seed: Option<u64>,
}

const DEFAULT_SEARCH_LIMIT: usize = 20;

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Estimate(args) => run_estimate(args),
        Command::Search(args) => run_search(args),
        Command::Insight(args) => run_insight(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = load_catalog(args.listings_csv.take())?;
    info!(listings = catalog.len(), "listing catalog loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        catalog: Arc::new(catalog),
        min_market_sample: config.market.min_market_sample,
    };

    let app = build_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pricing and ranking engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/pricing/estimate", post(estimate_endpoint))
        .route("/api/v1/market/insight", post(insight_endpoint))
        .route("/api/v1/search", post(search_endpoint))
        .with_state(state)
}

fn load_catalog(path: Option<PathBuf>) -> Result<Vec<PropertyListing>, AppError> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            let import = load_listings(file)?;
            if import.skipped > 0 {
                info!(skipped = import.skipped, "skipped malformed listing rows");
            }
            Ok(import.listings)
        }
        None => Ok(sample_listings()),
    }
}

fn area_seed(city: &str, state: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    city.trim().to_ascii_lowercase().hash(&mut hasher);
    state.trim().to_ascii_lowercase().hash(&mut hasher);
    hasher.finish()
}

fn area_insight(
    city: &str,
    state: &str,
    catalog: &[PropertyListing],
    min_sample: usize,
    seed: Option<u64>,
) -> MarketInsight {
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(|| area_seed(city, state)));
    market_insight(city, state, catalog, min_sample, &mut rng)
}

/// Applies structured filters against the catalog. Listings without a
/// listed rent pass the rent ceiling; the budget term scores them later
/// using the calculator's estimate.
fn apply_filters(catalog: &[PropertyListing], filters: &SearchFilters) -> Vec<PropertyListing> {
    catalog
        .iter()
        .filter(|listing| listing.status == ListingStatus::Active)
        .filter(|listing| {
            filters
                .bedrooms
                .map_or(true, |bedrooms| listing.bedrooms == bedrooms)
        })
        .filter(|listing| {
            filters
                .city
                .as_deref()
                .map_or(true, |city| listing.city.eq_ignore_ascii_case(city.trim()))
        })
        .filter(|listing| {
            filters
                .max_rent
                .map_or(true, |max| listing.current_rent.map_or(true, |rent| rent <= max))
        })
        .cloned()
        .collect()
}

/// Scores candidates against their own area's insight and orders them best
/// score first, newest first on ties.
fn rank_candidates(
    catalog: &[PropertyListing],
    filters: &SearchFilters,
    preferences: &UserPreferences,
    min_sample: usize,
) -> Vec<ScoredListing> {
    let candidates = apply_filters(catalog, filters);

    let mut insights: HashMap<String, MarketInsight> = HashMap::new();
    let mut scored: Vec<ScoredListing> = candidates
        .iter()
        .map(|listing| {
            let key = format!(
                "{}|{}",
                listing.city.to_ascii_lowercase(),
                listing.state.to_ascii_lowercase()
            );
            let insight = insights.entry(key).or_insert_with(|| {
                area_insight(&listing.city, &listing.state, catalog, min_sample, None)
            });
            score_listing(listing, preferences, insight)
        })
        .collect();

    scored.sort_by(ranking_order);
    scored
}

/// Structured filter fields win over whatever the query parser extracted.
fn resolve_filters(query: Option<&str>, explicit: Option<SearchFilters>) -> SearchFilters {
    let mut filters = query.map(parse_query).unwrap_or_default();
    if let Some(explicit) = explicit {
        if explicit.max_rent.is_some() {
            filters.max_rent = explicit.max_rent;
        }
        if explicit.bedrooms.is_some() {
            filters.bedrooms = explicit.bedrooms;
        }
        if explicit.city.is_some() {
            filters.city = explicit.city;
        }
    }
    filters
}

fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let inputs = RentInputs {
        property_type: args.property_type,
        bedrooms: args.bedrooms,
        bathrooms: args.bathrooms,
        square_footage: args.square_footage,
        city: args.city,
        state: args.state,
        amenities: args.amenities.into_iter().collect(),
    };

    let estimate = estimate_rent(&inputs)?;
    render_estimate(&inputs, &estimate);
    Ok(())
}

fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(args.listings_csv)?;

    let filters = parse_query(&args.query);
    let preferences = UserPreferences {
        budget_max: args.budget_max,
        amenities: args.amenities.into_iter().collect::<BTreeSet<String>>(),
        ..UserPreferences::default()
    };

    let ranked = rank_candidates(
        &catalog,
        &filters,
        &preferences,
        config.market.min_market_sample,
    );
    render_search(&args.query, &filters, &ranked, args.limit);
    Ok(())
}

fn run_insight(args: InsightArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(args.listings_csv)?;

    let insight = area_insight(
        &args.city,
        &args.state,
        &catalog,
        config.market.min_market_sample,
        args.seed,
    );
    render_insight(&insight);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn estimate_endpoint(
    Json(inputs): Json<RentInputs>,
) -> Result<Json<PriceEstimate>, AppError> {
    let estimate = estimate_rent(&inputs)?;
    Ok(Json(estimate))
}

async fn insight_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<InsightRequest>,
) -> Json<MarketInsight> {
    let insight = area_insight(
        &payload.city,
        &payload.state,
        &state.catalog,
        state.min_market_sample,
        payload.seed,
    );
    Json(insight)
}

async fn search_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let filters = resolve_filters(payload.query.as_deref(), payload.filters);
    let preferences = payload.preferences.unwrap_or_default();
    let limit = payload.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let mut results = rank_candidates(
        &state.catalog,
        &filters,
        &preferences,
        state.min_market_sample,
    );
    let total_matches = results.len();
    results.truncate(limit);

    Json(SearchResponse {
        filters,
        total_matches,
        results,
    })
}

fn render_estimate(inputs: &RentInputs, estimate: &PriceEstimate) {
    println!(
        "Rent estimate for a {} in {}, {}",
        inputs.property_type, inputs.city, inputs.state
    );
    println!(
        "Base price: INR {} (location x{:.2}, bedrooms x{:.2}, bathrooms x{:.2})",
        estimate.base_price,
        estimate.location_multiplier,
        estimate.bedroom_multiplier,
        estimate.bathroom_multiplier
    );
    println!("Amenities value: INR {}", estimate.amenities_value);
    println!(
        "Recommended rent: INR {} (range {} - {})",
        estimate.total_price, estimate.price_range_min, estimate.price_range_max
    );
}

fn render_search(query: &str, filters: &SearchFilters, ranked: &[ScoredListing], limit: usize) {
    println!("Search: {query}");
    print!("Filters:");
    match (&filters.city, filters.bedrooms, filters.max_rent) {
        (None, None, None) => println!(" none extracted"),
        (city, bedrooms, max_rent) => {
            if let Some(city) = city {
                print!(" city={city}");
            }
            if let Some(bedrooms) = bedrooms {
                print!(" bedrooms={bedrooms}");
            }
            if let Some(max_rent) = max_rent {
                print!(" max_rent={max_rent}");
            }
            println!();
        }
    }

    if ranked.is_empty() {
        println!("\nNo matching listings");
        return;
    }

    println!("\nRanked results");
    for scored in ranked.iter().take(limit) {
        let rent_note = match scored.effective_rent {
            Some(rent) => format!("INR {rent}"),
            None => "unpriced".to_string(),
        };
        let position_note = scored
            .market_position
            .map(|position| format!(", {}", position.label()))
            .unwrap_or_default();
        println!(
            "- {} | {} {} bed in {} | {} | score {:.1}{}",
            scored.listing.id,
            scored.listing.property_type.label(),
            scored.listing.bedrooms,
            scored.listing.city,
            rent_note,
            scored.score,
            position_note
        );
    }
}

fn render_insight(insight: &MarketInsight) {
    let metrics = insight.metrics();
    if insight.is_estimate() {
        println!(
            "Market insight for {}, {} (synthetic estimate, {} priced listings on record)",
            metrics.city, metrics.state, metrics.sample_size
        );
    } else {
        println!(
            "Market insight for {}, {} ({} priced listings)",
            metrics.city, metrics.state, metrics.sample_size
        );
    }

    println!(
        "Demand {}/100, inventory {}, rents {}",
        metrics.demand_score,
        metrics.inventory.label(),
        metrics.trend.label()
    );

    println!("\nAverage rent by bedrooms");
    for band in &metrics.rent_bands {
        println!("- {} bed: INR {}", band.bedrooms, band.average_rent);
    }

    println!("\nRecommendations");
    for recommendation in &metrics.recommendations {
        println!("- {recommendation}");
    }
}
