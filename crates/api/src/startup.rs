use crate::{
    db::{self, ClimateAccess, ClimateData, ClimateSnapshot},
    index_handler, precipitation, routes, stations, temperature_between, temperature_from, tobs,
    ActiveStationPolicy,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub climate_db: Arc<dyn ClimateData>,
    pub snapshot: ClimateSnapshot,
    pub active_station: ActiveStationPolicy,
}

impl AppState {
    /// Derive the dataset snapshot and wrap it with the store for handlers.
    pub async fn new(
        climate_db: Arc<dyn ClimateData>,
        active_station: ActiveStationPolicy,
    ) -> Result<Self, db::Error> {
        let snapshot = ClimateSnapshot::load(climate_db.as_ref()).await?;
        Ok(Self {
            climate_db,
            snapshot,
            active_station,
        })
    }

    /// Station whose observations `/api/v1.0/tobs` reports, per the configured policy
    pub async fn most_active_station(&self) -> Result<String, db::Error> {
        match self.active_station {
            ActiveStationPolicy::Startup => Ok(self.snapshot.most_active_station.clone()),
            ActiveStationPolicy::PerRequest => self
                .climate_db
                .most_active_station()
                .await?
                .ok_or(db::Error::EmptyDataset),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_from,
        routes::climate::climate_routes::temperature_between,
    ),
    components(
        schemas(
                routes::ErrorBody,
        )
    ),
    tags(
        (name = "climate api", description = "a read-only RESTful api over historical station precipitation and temperature observations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    database_path: &str,
    max_connections: u32,
    active_station: ActiveStationPolicy,
) -> Result<AppState, anyhow::Error> {
    let climate_db = Arc::new(
        ClimateAccess::open(database_path, max_connections)
            .await
            .map_err(|e| anyhow!("error opening climate dataset {}: {}", database_path, e))?,
    );

    AppState::new(climate_db, active_station)
        .await
        .context("error loading dataset snapshot")
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_from))
        .route("/api/v1.0/{start}/{end}", get(temperature_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
