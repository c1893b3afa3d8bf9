use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::BookingError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        code: &'static str,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Storage error")]
    StoreError(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { code, .. } => *code,
            AppError::StoreError(_) => "STORAGE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => {
                warn!(error = ?self, message = %msg, "Request rejected");
            }
            AppError::Conflict { message, .. } => {
                warn!(error = ?self, message = %message, "Request conflicts with current state");
            }
            AppError::StoreError(e) => {
                error!(error = ?e, "Storage error");
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::ShowNotFound(_) | BookingError::TicketNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            BookingError::InvalidBooking(msg) => AppError::ValidationError(msg),
            BookingError::TicketContended(ticket_id) => AppError::Conflict {
                code: "TICKET_CONTENDED",
                message: "The ticket was changed by another request, try again".to_string(),
                details: Some(json!({ "ticket_id": ticket_id })),
            },
            BookingError::InsufficientSeats {
                show_id,
                requested,
                available,
            } => AppError::Conflict {
                code: "INSUFFICIENT_SEATS",
                message: format!(
                    "Only {} seat(s) left for this show, {} requested",
                    available, requested
                ),
                details: Some(json!({
                    "show_id": show_id,
                    "requested": requested,
                    "available": available,
                })),
            },
            BookingError::Store(e) => AppError::StoreError(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let (public_message, details) = match self {
            AppError::ValidationError(msg) | AppError::NotFound(msg) => (msg, None),
            AppError::Conflict {
                message, details, ..
            } => (message, details),
            AppError::StoreError(_) => ("A storage error occurred".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}
