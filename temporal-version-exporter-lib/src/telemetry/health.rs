use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use hyper::StatusCode;
use serde_json::json;

use crate::error::{ExporterError, Result};

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Health check response - always returns 200 if process is running
pub fn health_check_response() -> Result<Response<RespBody>> {
    let body = json!({"status": "healthy"});
    let body_bytes = serde_json::to_vec(&body)
        .map_err(|e| ExporterError::Http(format!("Failed to serialize health response: {e}")))?;

    let body = Full::new(Bytes::from(body_bytes))
        .map_err(|never| match never {})
        .boxed();

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(body)
        .map_err(|e| ExporterError::Http(format!("Failed to build health response: {e}")))
}

pub fn not_found_response() -> Response<RespBody> {
    plain_response(StatusCode::NOT_FOUND, "Not Found")
}

pub fn internal_error_response() -> Response<RespBody> {
    plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

fn plain_response(status: StatusCode, text: &'static str) -> Response<RespBody> {
    let body = Full::new(Bytes::from(text))
        .map_err(|never| match never {})
        .boxed();
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp
}
