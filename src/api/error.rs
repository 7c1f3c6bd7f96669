use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::db::DbError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

impl DbError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DbError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            DbError::NotFound(_) => StatusCode::NOT_FOUND,
            DbError::InvalidIdentifier(_) | DbError::MissingSchema(_) => StatusCode::BAD_REQUEST,
            DbError::Provisioning(_)
            | DbError::Migration(_)
            | DbError::Migrate(_)
            | DbError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DbError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}
