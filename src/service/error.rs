use thiserror::Error;
use uuid::Uuid;
use crate::error::HttpError;
use axum::http::StatusCode;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("'{0}' is not a valid order kind")]
    InvalidOrderKind(String),

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Contract not found")]
    ContractNotFound,

    #[error("Payment request not found")]
    PaymentRequestNotFound,

    #[error("Not authorized to perform this action")]
    Forbidden,

    #[error("A contract must be anchored to exactly one order")]
    InvalidAnchor,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            ServiceError::OrderNotFound(_)
            | ServiceError::ConversationNotFound
            | ServiceError::MessageNotFound
            | ServiceError::ContractNotFound
            | ServiceError::PaymentRequestNotFound => "not_found",

            ServiceError::Forbidden => "forbidden",

            ServiceError::InvalidState(_) => "invalid_state",

            ServiceError::InvalidOrderKind(_)
            | ServiceError::InvalidAnchor
            | ServiceError::Validation(_) => "validation_error",

            ServiceError::Gateway(_) => "gateway_error",

            ServiceError::Database(_) => "server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::OrderNotFound(_)
            | ServiceError::ConversationNotFound
            | ServiceError::MessageNotFound
            | ServiceError::ContractNotFound
            | ServiceError::PaymentRequestNotFound => StatusCode::NOT_FOUND,

            ServiceError::Forbidden => StatusCode::FORBIDDEN,

            ServiceError::InvalidState(_) => StatusCode::CONFLICT,

            ServiceError::InvalidOrderKind(_)
            | ServiceError::InvalidAnchor
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Gateway(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        let code = error.reason_code();
        HttpError::with_code(error.to_string(), code, status)
    }
}
