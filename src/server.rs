use crate::catalog::{Brand, BrandEntry, Category};
use crate::config::AppConfig;
use crate::engine::{Engine, RegionReport};
use crate::filter::{FilterAction, FilterState};
use crate::types::{ComparisonSummary, Period, RegionStats};
use anyhow::{anyhow, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub engine: Engine,
}

/// A malformed query parameter, reported as `400` with a JSON body.
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": format!("{:#}", self.0) }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError(e)
    }
}

#[derive(Deserialize)]
pub struct LocateParams {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize)]
pub struct LocateResponse {
    pub region: String,
}

#[derive(Deserialize, Default)]
pub struct RegionParams {
    pub region: String,
    /// Comma-separated brands; all brands when absent.
    pub brands: Option<String>,
    /// Comma-separated categories. When absent: none if `brands` is given,
    /// otherwise all categories.
    pub categories: Option<String>,
    pub period: Option<String>,
}

#[derive(Deserialize)]
pub struct CompareParams {
    pub a: String,
    pub b: String,
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub state: FilterState,
    pub action: FilterAction,
}

fn parse_list<T>(raw: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

fn filter_from_params(engine: &Engine, params: &RegionParams) -> Result<FilterState> {
    let defaults = engine.default_filter();
    let brands: Vec<Brand> = match &params.brands {
        Some(raw) => parse_list(raw)?,
        None => defaults.active_brands.into_iter().collect(),
    };
    let categories: Vec<Category> = match (&params.categories, &params.brands) {
        (Some(raw), _) => parse_list(raw)?,
        (None, Some(_)) => Vec::new(),
        (None, None) => defaults.active_categories.into_iter().collect(),
    };
    Ok(FilterState::from_parts(engine.catalog(), brands, categories))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/catalog", get(catalog_handler))
        .route("/api/regions", get(regions_handler))
        .route("/api/locate", get(locate_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/metrics", get(metrics_handler))
        .route("/api/compare", get(compare_handler))
        .route("/api/filter/toggle", post(toggle_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, engine: Engine) -> Result<()> {
    let state = Arc::new(AppState { engine });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let mut app = router(state);
    if let Some(dir) = &config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<Vec<BrandEntry>> {
    Json(state.engine.catalog().entries().to_vec())
}

pub async fn regions_handler(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(
        state
            .engine
            .store()
            .regions()
            .iter()
            .map(|r| r.name.clone())
            .collect(),
    )
}

pub async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateParams>,
) -> Json<Option<LocateResponse>> {
    Json(
        state
            .engine
            .store()
            .locate(params.lon, params.lat)
            .map(|region| LocateResponse {
                region: region.name.clone(),
            }),
    )
}

pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RegionParams>,
) -> Result<Json<Option<RegionStats>>, ApiError> {
    let filter = filter_from_params(&state.engine, &params)?;
    Ok(Json(state.engine.region_stats(&params.region, &filter)))
}

pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RegionParams>,
) -> Result<Json<Option<RegionReport>>, ApiError> {
    let filter = filter_from_params(&state.engine, &params)?;
    let period = match &params.period {
        Some(raw) => raw.parse::<Period>()?,
        None => Period::default(),
    };
    Ok(Json(state.engine.region_report(&params.region, &filter, period)))
}

pub async fn compare_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareParams>,
) -> Result<Json<ComparisonSummary>, ApiError> {
    let brand_a: Brand = params.a.parse()?;
    let brand_b: Brand = params.b.parse()?;
    if brand_a == brand_b {
        return Err(anyhow!("Cannot compare {} with itself", brand_a).into());
    }
    Ok(Json(state.engine.compare(brand_a, brand_b)))
}

pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleRequest>,
) -> Json<FilterState> {
    let catalog = state.engine.catalog();
    let current = FilterState::from_parts(
        catalog,
        request.state.active_brands,
        request.state.active_categories,
    );
    Json(current.apply(catalog, request.action))
}
