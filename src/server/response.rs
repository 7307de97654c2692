use std::path::Path;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use thiserror::Error;

pub type HttpResponse = Response<Full<Bytes>>;

/// Faults while turning a request into a response. Everything here maps
/// to a 500 at the service boundary; "not found" is not an error.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),
    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServeResult = Result<HttpResponse, ServeError>;

/// A file's bytes with the content type guessed from its extension.
pub fn file_response(path: &Path, body: Bytes) -> ServeResult {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime.as_ref())
        .body(Full::new(body))?;
    Ok(response)
}

pub fn script_response(script: &str) -> ServeResult {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/javascript")
        .body(Full::new(Bytes::from(script.to_string())))?;
    Ok(response)
}

pub fn json_response(body: impl Into<Bytes>) -> ServeResult {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(body.into()))?;
    Ok(response)
}

pub fn empty_response(status: StatusCode) -> ServeResult {
    let response = Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))?;
    Ok(response)
}

pub fn text_response(status: StatusCode, body: &str) -> ServeResult {
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.to_string())))?;
    Ok(response)
}
