//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use guidepath_core::protocol::FailureResponse;
use guidepath_eye::VisionError;
use thiserror::Error;
use tracing::error;

pub const NO_IMAGE: &str = "No image received";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image received")]
    NoImage,

    #[error("Undecodable image: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoImage | ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VisionError> for ApiError {
    fn from(err: VisionError) -> Self {
        if err.is_client_error() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            // no decodable image is the same answer as no image at all
            ApiError::NoImage | ApiError::Decode(_) => FailureResponse::with_error(NO_IMAGE),
            ApiError::Internal(detail) => {
                error!("Error: {}", detail);
                FailureResponse::bare()
            }
        };
        (self.status(), Json(body)).into_response()
    }
}
