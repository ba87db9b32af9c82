//! Error responses of the mock service.
//!
//! Like the real service, a rejected key gets an HTML page rather than JSON,
//! and validation failures come back as plain text.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

const FORBIDDEN_PAGE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">\n\
<title>403 Forbidden</title>\n\
<h1>Forbidden</h1>\n\
<p>Please provide 'auth_key' Header</p>\n";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl From<MultipartError> for ServiceError {
    fn from(e: MultipartError) -> Self {
        ServiceError::BadRequest(format!("malformed multipart body: {e}"))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Forbidden => {
                (StatusCode::FORBIDDEN, Html(FORBIDDEN_PAGE)).into_response()
            }
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ServiceError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::BadRequest("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("gone".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn forbidden_is_html() {
        let resp = ServiceError::Forbidden.into_response();
        let ct = resp.headers()["content-type"].to_str().unwrap();
        assert!(ct.starts_with("text/html"), "{ct}");
    }
}
