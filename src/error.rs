use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid transition: {role} may not move an order from {from} to {to}")]
    InvalidTransition {
        role: String,
        from: String,
        to: String,
    },

    #[error("Insufficient amount: ETB {shortfall} more required")]
    InsufficientPayment { shortfall: i64 },

    #[error("Payment provider error: {0}")]
    ExternalPayment(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::InvalidTransition { .. } => StatusCode::FORBIDDEN,
            AppError::InsufficientPayment { .. } => StatusCode::BAD_REQUEST,
            AppError::ExternalPayment(_) => StatusCode::BAD_GATEWAY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_is_reported_in_the_message() {
        let err = AppError::InsufficientPayment { shortfall: 50 };
        assert_eq!(err.to_string(), "Insufficient amount: ETB 50 more required");
    }

    #[test]
    fn invalid_transition_names_all_three_inputs() {
        let err = AppError::InvalidTransition {
            role: "cook".into(),
            from: "preparing".into(),
            to: "delivered".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cook") && msg.contains("preparing") && msg.contains("delivered"));
    }
}
