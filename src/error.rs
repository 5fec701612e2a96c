use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::state::User;

#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("{message}")]
    Validation { message: String },

    #[error("Phone number already checked in")]
    Duplicate { user: Box<User> },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // Store errors
    #[error("Failed to read store from '{path}': {source}")]
    StoreRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse store file '{path}': {source}")]
    StoreParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save store to '{path}': {source}")]
    StoreSave {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Duplicate { user } => json!({
                "error": self.to_string(),
                "user": user,
            }),
            AppError::Validation { .. } | AppError::NotFound { .. } => json!({
                "error": self.to_string(),
            }),
            other => {
                tracing::error!(error = %other, "Request failed");
                json!({ "error": "An internal error occurred" })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
