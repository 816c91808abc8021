//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Every body this crate sends is JSON, so the typed terminators take a
//! `Serialize` value rather than raw bytes.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

const JSON: &str = "application/json";

// Sent when a value refuses to serialise; keeps the JSON-only contract.
const SERIALIZE_FAILED: &[u8] = br#"{"message":"Internal server error"}"#;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use posts::Response;
///
/// Response::json(&serde_json::json!({"id": 1}));
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use posts::Response;
/// use http::StatusCode;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/api/posts/42")
///     .json(&serde_json::json!({"id": 42}));
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: StatusCode,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::builder().json(value)
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub fn code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper response the server writes to the wire.
    ///
    /// A header that is not valid HTTP syntax turns the whole response into a
    /// bare `500`; handlers only ever set headers they built themselves.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                error!("invalid response header: {e}");
                let mut res = http::Response::new(Full::new(Bytes::new()));
                *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                res
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    ///
    /// Serialisation failure yields a `500` with a fixed JSON message.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => self.finish(body),
            Err(e) => {
                error!("failed to serialise response body: {e}");
                self.status(StatusCode::INTERNAL_SERVER_ERROR)
                    .finish(SERIALIZE_FAILED.to_vec())
            }
        }
    }

    fn finish(self, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), JSON.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// `Ok` and `Err` both render; handlers can use `?` on any error that
/// converts into a response.
impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

/// `200 OK` with `T` serialised as JSON.
///
/// ```rust,ignore
/// async fn list(_req: Request, store: SharedStore) -> Result<Json<Vec<Post>>, ApiError> {
///     Ok(Json(store.list(&PostFilter::default()).await?))
/// }
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response { Response::json(&self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/api/posts/1")
            .json(&serde_json::json!({"id": 1}));
        assert_eq!(res.code(), StatusCode::CREATED);
        assert_eq!(res.headers[0], ("content-type".to_owned(), JSON.to_owned()));
        assert_eq!(res.header("Location"), Some("/api/posts/1"));
        assert_eq!(res.body(), br#"{"id":1}"#);
    }

    #[test]
    fn result_renders_either_side() {
        let ok: Result<Json<u8>, ApiError> = Ok(Json(7));
        let err: Result<Json<u8>, ApiError> = Err(ApiError::NotFound("7".into()));
        assert_eq!(ok.into_response().body(), b"7");
        assert_eq!(err.into_response().code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_header_degrades_to_500() {
        let res = Response::builder().header("bad header", "x").json(&()).into_inner();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
