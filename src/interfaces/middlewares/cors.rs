use actix_web::{http::header, middleware::DefaultHeaders, HttpResponse};

use crate::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_MAX_AGE_SECS};

/// Attaches the fixed CORS header set to every response, errors included.
///
/// `allowed_origin` must be a valid header value; `AppConfig::validate`
/// guarantees this for configured origins.
pub fn cors_headers(allowed_origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin.to_string()))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS))
}

/// Empty preflight answer; the origin/methods/headers come from `cors_headers`.
pub fn preflight_response() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, CORS_MAX_AGE_SECS.to_string()))
        .finish()
}
