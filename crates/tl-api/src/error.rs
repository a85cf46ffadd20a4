//! Maps `AppError` onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use thiserror::Error;
use tl_core::error::AppError;
use tl_ui::{ErrorTemplate, Layout};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::NotFound(..)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::App(AppError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::App(AppError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::App(AppError::Internal(_)) | ApiError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("request failed: {}", self);
            "Something went wrong. Please try again.".to_string()
        } else {
            self.to_string()
        };

        let page = ErrorTemplate {
            layout: Layout::new(status.canonical_reason().unwrap_or("Error"), None),
            status: status.as_u16(),
            message: message.clone(),
        };
        match page.render() {
            Ok(html) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(_) => HttpResponse::build(status).body(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (AppError::not_found("Telll", "x"), StatusCode::NOT_FOUND),
            (AppError::ValidationError("short".into()), StatusCode::BAD_REQUEST),
            (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (AppError::Internal("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[actix_web::test]
    async fn internal_details_stay_out_of_the_page() {
        let err = ApiError::from(AppError::Internal("Failed to delete Telll: disk I/O".into()));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains("disk I/O"));
    }
}
