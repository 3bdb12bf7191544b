use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    Json,
};
use log::debug;
use time::Date;

use crate::{
    db::{parse_date, DateBounds, PrecipitationReading, TemperatureSummary},
    ApiError, AppState, ErrorBody,
};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "One `{date: precipitation}` object per measurement in the trailing 12 months", content_type = "application/json", body = Vec<HashMap<String, f64>>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset", body = ErrorBody)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationReading>>, ApiError> {
    let readings = state
        .climate_db
        .precipitation(&state.snapshot.window)
        .await?;
    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station identifier in the dataset", content_type = "application/json", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset", body = ErrorBody)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let stations = state.climate_db.stations().await?;
    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations of the most active station in the trailing 12 months", content_type = "application/json", body = Vec<f64>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset", body = ErrorBody)
    ))]
pub async fn tobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<f64>>, ApiError> {
    let station = state.most_active_station().await?;
    let observations = state
        .climate_db
        .temperature_observations(&station, &state.snapshot.window)
        .await?;
    Ok(Json(observations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
         ("start" = String, Path, description = "First date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "`[min, avg, max]` temperature from the start date onward, null when no rows match", content_type = "application/json", body = Vec<f64>),
        (status = BAD_REQUEST, description = "Date is not YYYY-MM-DD", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset", body = ErrorBody)
    ))]
pub async fn temperature_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    let bounds = DateBounds {
        start: parse_request_date(&start)?,
        end: None,
    };
    let summary = state.climate_db.temperature_summary(&bounds).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
         ("start" = String, Path, description = "First date to include, YYYY-MM-DD"),
         ("end" = String, Path, description = "Last date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "`[min, avg, max]` temperature between both dates inclusive, null when no rows match", content_type = "application/json", body = Vec<f64>),
        (status = BAD_REQUEST, description = "A date is not YYYY-MM-DD", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read the dataset", body = ErrorBody)
    ))]
pub async fn temperature_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureSummary>, ApiError> {
    let bounds = DateBounds {
        start: parse_request_date(&start)?,
        end: Some(parse_request_date(&end)?),
    };
    let summary = state.climate_db.temperature_summary(&bounds).await?;
    Ok(Json(summary))
}

fn parse_request_date(raw: &str) -> Result<Date, ApiError> {
    parse_date(raw).map_err(|e| {
        debug!("rejecting date {:?}: {}", raw, e);
        ApiError::InvalidDateFormat
    })
}
