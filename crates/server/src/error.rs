use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use courserec_common::CourseRecError;
use std::fmt;

use crate::types::ErrorResponse;

/// HTTP wrapper around `CourseRecError`
#[derive(Debug)]
pub struct ApiError(pub CourseRecError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<CourseRecError> for ApiError {
    fn from(err: CourseRecError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.0.to_string(),
        })
    }
}
