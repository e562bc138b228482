// City Budget - Web Server
// JSON API over an immutable price catalog

use axum::{
    extract::{rejection::JsonRejection, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_budget::affordability::{equivalent_salary, evaluate_offer, AffordabilityTier};
use city_budget::{
    compare_selected, compute_budget, compute_monthly_budget, emi, tier, AppConfig, City,
    ComparisonResult, ComputedBudget, EmiBreakdown, OfferEvaluation, PriceCatalog, ProfileKey,
    SelectionState, ShareState,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "City Budget API server", long_about = None)]
struct Args {
    /// JSON config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Price catalog (.csv or .json)
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(long)]
    addr: Option<String>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    catalog: Arc<PriceCatalog>,
    config: Arc<AppConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!(%message, "rejected request");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

impl AppState {
    fn city(&self, slug: &str) -> Result<&City, Response> {
        self.catalog
            .get(slug)
            .ok_or_else(|| bad_request(format!("unknown city '{}'", slug)))
    }
}

/// Malformed bodies, including selections that fail validation, get the
/// same 400 envelope as every other bad input
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

fn valid_amount(value: f64, name: &str) -> Result<f64, Response> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(bad_request(format!("{} must be a non-negative number", name)))
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Serialize)]
struct CitySummary {
    slug: String,
    name: String,
    price_count: usize,
}

#[derive(Deserialize)]
struct BudgetRequest {
    city: String,
    #[serde(default)]
    selection: Option<SelectionState>,
}

#[derive(Deserialize)]
struct TierQuery {
    city: String,
    salary: f64,
    profile: Option<String>,
    centre: Option<String>,
}

#[derive(Serialize)]
struct TierResponse {
    city_slug: String,
    salary: f64,
    monthly_cost: f64,
    tier: AffordabilityTier,
    label: &'static str,
    description: &'static str,
}

#[derive(Deserialize)]
struct EquivalentRequest {
    from: String,
    to: String,
    salary: f64,
    offer: Option<f64>,
    accommodation: Option<String>,
    #[serde(default)]
    selection: Option<SelectionState>,
}

#[derive(Serialize)]
struct EquivalentResponse {
    from_slug: String,
    to_slug: String,
    salary: f64,
    equivalent_salary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    offer: Option<OfferEvaluation>,
}

#[derive(Deserialize)]
struct EmiQuery {
    principal: f64,
    rate: f64,
    years: u32,
}

#[derive(Deserialize)]
struct ShareEncodeRequest {
    selection: SelectionState,
    #[serde(default)]
    salaries: Vec<f64>,
}

#[derive(Serialize)]
struct ShareEncodeResponse {
    query: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/cities - Catalog cities
async fn get_cities(State(state): State<AppState>) -> Response {
    let cities: Vec<CitySummary> = state
        .catalog
        .cities()
        .iter()
        .map(|city| CitySummary {
            slug: city.slug.clone(),
            name: city.name.clone(),
            price_count: city.entries.len(),
        })
        .collect();

    ApiResponse::ok(cities)
}

/// POST /api/budget - Budget for one city
async fn post_budget(
    State(state): State<AppState>,
    payload: Result<Json<BudgetRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let city = match state.city(&req.city) {
        Ok(city) => city,
        Err(resp) => return resp,
    };
    let selection = req
        .selection
        .unwrap_or_else(|| SelectionState::for_city(state.config.default_profile, &req.city));

    let budget: ComputedBudget = compute_budget(city, &selection);
    ApiResponse::ok(budget)
}

/// POST /api/compare - Compare the selection's cities
async fn post_compare(
    State(state): State<AppState>,
    payload: Result<Json<SelectionState>, JsonRejection>,
) -> Response {
    let selection = match json_body(payload) {
        Ok(selection) => selection,
        Err(resp) => return resp,
    };
    match compare_selected(&state.catalog, &selection) {
        Ok(result) => ApiResponse::<ComparisonResult>::ok(result),
        Err(e) => bad_request(e.to_string()),
    }
}

/// GET /api/tier?city=&salary=&profile=&centre= - Affordability tier
async fn get_tier(State(state): State<AppState>, Query(q): Query<TierQuery>) -> Response {
    let city = match state.city(&q.city) {
        Ok(city) => city,
        Err(resp) => return resp,
    };
    let salary = match valid_amount(q.salary, "salary") {
        Ok(salary) => salary,
        Err(resp) => return resp,
    };
    let profile = match q.profile.as_deref() {
        Some(value) => match ProfileKey::parse(value) {
            Some(profile) => profile,
            None => return bad_request(format!("unknown profile '{}'", value)),
        },
        None => state.config.default_profile,
    };

    let mut selection = SelectionState::for_city(profile, &q.city);
    selection.use_centre(q.centre.as_deref() != Some("0"));

    let monthly_cost = compute_monthly_budget(city, &selection).total;
    let level = tier(salary, monthly_cost);
    ApiResponse::ok(TierResponse {
        city_slug: city.slug.clone(),
        salary,
        monthly_cost,
        tier: level,
        label: level.label(),
        description: level.description(),
    })
}

/// POST /api/equivalent - Equivalent salary and optional offer check
async fn post_equivalent(
    State(state): State<AppState>,
    payload: Result<Json<EquivalentRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let (city_a, city_b) = match (state.city(&req.from), state.city(&req.to)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let salary = match valid_amount(req.salary, "salary") {
        Ok(salary) => salary,
        Err(resp) => return resp,
    };
    let offer = match req.offer.map(|o| valid_amount(o, "offer")).transpose() {
        Ok(offer) => offer,
        Err(resp) => return resp,
    };

    let selection = match req.selection {
        Some(selection) => selection,
        None if req.from == req.to => {
            SelectionState::for_city(state.config.default_profile, &req.from)
        }
        None => match SelectionState::new(state.config.default_profile, &[&req.from, &req.to]) {
            Ok(selection) => selection,
            Err(e) => return bad_request(e.to_string()),
        },
    };

    ApiResponse::ok(EquivalentResponse {
        from_slug: req.from.clone(),
        to_slug: req.to.clone(),
        salary,
        equivalent_salary: equivalent_salary(
            salary,
            city_a,
            city_b,
            req.accommodation.as_deref(),
            &selection,
        ),
        offer: offer.map(|o| evaluate_offer(salary, city_a, o, city_b, &selection)),
    })
}

/// GET /api/emi?principal=&rate=&years= - Loan EMI
async fn get_emi(Query(q): Query<EmiQuery>) -> Response {
    let breakdown: EmiBreakdown = emi(q.principal, q.rate, q.years);
    ApiResponse::ok(breakdown)
}

/// POST /api/share/encode - Selection → share query
async fn post_share_encode(payload: Result<Json<ShareEncodeRequest>, JsonRejection>) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let query = ShareState::from_selection(&req.selection, &req.salaries).encode();
    ApiResponse::ok(ShareEncodeResponse { query })
}

/// GET /api/share/decode?<share query> - Share query → state
async fn get_share_decode(RawQuery(query): RawQuery) -> Response {
    ApiResponse::ok(ShareState::decode(query.as_deref().unwrap_or("")))
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/cities", get(get_cities))
        .route("/budget", post(post_budget))
        .route("/compare", post(post_compare))
        .route("/tier", get(get_tier))
        .route("/equivalent", post(post_equivalent))
        .route("/emi", get(get_emi))
        .route("/share/encode", post(post_share_encode))
        .route("/share/decode", get(get_share_decode))
        .with_state(state)
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🌐 City Budget - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(path) = args.catalog {
        config.catalog_path = path;
    }
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }

    let catalog = PriceCatalog::load(&config.catalog_path)?;
    println!(
        "✓ Catalog loaded: {} cities from {:?}",
        catalog.len(),
        config.catalog_path
    );

    let addr = config.server_addr.clone();
    let state = AppState {
        catalog: Arc::new(catalog),
        config: Arc::new(config),
    };

    let app = Router::new()
        .nest("/api", api_routes(state))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!(%addr, "listening");

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/cities", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
