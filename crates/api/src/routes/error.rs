use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;

pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Use YYYY-MM-DD.";

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{}", INVALID_DATE_MESSAGE)]
    InvalidDateFormat,
    #[error("{0}")]
    Storage(#[from] db::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidDateFormat => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) => {
                error!("error reading climate data: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
