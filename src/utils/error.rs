use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::blog::blog_error::BlogError;
use crate::database::StoreError;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong on the server.";

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    BadRequestError(String),

    #[error("{0}")]
    ConflictError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("{0}")]
    UnauthenticatedError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    ValidationError(String),
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::UnauthenticatedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            CustomError::InternalServerError(detail) => {
                error!("{}", detail);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": message,
        }))
    }
}

impl From<StoreError> for CustomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(key) => {
                CustomError::ConflictError(format!("A record with this {} already exists.", key))
            }
            other => CustomError::InternalServerError(other.to_string()),
        }
    }
}

impl From<BlogError> for CustomError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::NotFound(message) => CustomError::NotFoundError(message),
            BlogError::Conflict(message) => CustomError::ConflictError(message),
            BlogError::InvalidState(message) => CustomError::BadRequestError(message),
            BlogError::Store(err) => CustomError::from(err),
        }
    }
}
