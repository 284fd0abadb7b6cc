use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use super::error_response;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error("Invalid debt file {path}: {source}")]
    DebtFileFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not read debt file {path}: {source}")]
    DebtFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Debt id must not be empty (debt #{0})")]
    EmptyDebtId(usize),

    #[error("Duplicate debt id: {0}")]
    DuplicateDebtId(String),

    #[error("targetId is required")]
    MissingTarget,

    #[error("Unknown targetId: {0}")]
    UnknownTarget(String),

    #[error("One of monthsToTarget or goalDate is required")]
    MissingGoal,

    #[error("Could not encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(rejection) => rejection.status(),
            ApiError::EmptyDebtId(_)
            | ApiError::DuplicateDebtId(_)
            | ApiError::MissingTarget
            | ApiError::UnknownTarget(_)
            | ApiError::MissingGoal
            | ApiError::DebtFileFormat { .. } => StatusCode::BAD_REQUEST,
            ApiError::DebtFile { .. } | ApiError::Encode(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, error = %self, "rejected request");
        error_response(status, &self.to_string())
    }
}
