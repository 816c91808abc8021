//! Error types.
//!
//! Two layers, kept apart on purpose:
//!
//! - [`Error`] is what the process sees: binding a port, parsing the bind
//!   address, installing the log subscriber. It never reaches a client.
//! - [`ApiError`] is what a client sees. Every variant maps to one status code
//!   and renders as `{"message": "..."}`, so handlers can return
//!   `Result<Response, ApiError>` and bail out with `?`.

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::method::Method;
use crate::response::{IntoResponse, Response};
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Infrastructure failures returned by [`Server`](crate::Server) and `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// A request that could not be served. Rendered as a JSON `message`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request must accept {0} data")]
    NotAcceptable(&'static str),

    #[error("Request must contain {0} data")]
    UnsupportedMediaType(&'static str),

    #[error("{0}")]
    UnprocessableEntity(#[from] ValidationError),

    #[error("Failed to decode JSON object: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Holds the id as the client wrote it, so ids too large for `i64` still
    /// read back verbatim.
    #[error("Could not find post with id {0}")]
    NotFound(String),

    #[error("No route for {method} {path}")]
    NoRoute { method: String, path: String },

    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Internal server error")]
    Internal(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MalformedJson(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) | Self::NoRoute { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub(crate) fn no_route(method: Method, path: &str) -> Self {
        Self::NoRoute { method: method.to_string(), path: path.to_owned() }
    }
}

#[derive(Serialize)]
struct Message {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            error!(error = %source, "store operation failed");
        }
        Response::builder()
            .status(self.status())
            .json(&Message { message: self.to_string() })
    }
}
