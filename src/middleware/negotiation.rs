//! Content-negotiation guards.
//!
//! ```rust,ignore
//! async fn create(req: Request, store: SharedStore) -> Result<Response, ApiError> {
//!     negotiation::accept(&req, JSON)?;
//!     negotiation::require(&req, JSON)?;
//!     ...
//! }
//! ```

use crate::error::ApiError;
use crate::request::Request;

pub const JSON: &str = "application/json";

/// Fails with `406` unless the `Accept` header admits `mime`.
///
/// Each comma-separated media range matches on an exact type, a `type/*`
/// wildcard, or `*/*`. Ranges with `q=0` are refusals and never match. A
/// missing header admits nothing.
pub fn accept(req: &Request, mime: &'static str) -> Result<(), ApiError> {
    let header = req.header("accept").unwrap_or_default();
    if header.split(',').any(|range| range_admits(range, mime)) {
        Ok(())
    } else {
        Err(ApiError::NotAcceptable(mime))
    }
}

/// Fails with `415` unless the body's `Content-Type` essence is `mime`.
/// Parameters such as `charset` are ignored.
pub fn require(req: &Request, mime: &'static str) -> Result<(), ApiError> {
    match req.header("content-type").map(essence) {
        Some(actual) if actual.eq_ignore_ascii_case(mime) => Ok(()),
        _ => Err(ApiError::UnsupportedMediaType(mime)),
    }
}

fn essence(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}

fn range_admits(range: &str, mime: &str) -> bool {
    let mut parts = range.split(';');
    let media = parts.next().unwrap_or_default().trim();
    if media.is_empty() || refused(parts) {
        return false;
    }

    let Some((want_type, want_sub)) = mime.split_once('/') else {
        return false;
    };
    match media.split_once('/') {
        Some(("*", "*")) => true,
        Some((ty, "*")) => ty.eq_ignore_ascii_case(want_type),
        Some((ty, sub)) => ty.eq_ignore_ascii_case(want_type) && sub.eq_ignore_ascii_case(want_sub),
        None => false,
    }
}

// q=0 means "not acceptable"
fn refused<'a>(mut params: impl Iterator<Item = &'a str>) -> bool {
    params.any(|param| match param.split_once('=') {
        Some((key, value)) if key.trim().eq_ignore_ascii_case("q") => {
            value.trim().parse::<f32>().map_or(true, |q| q <= 0.0)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::method::Method;

    fn with_header(name: &str, value: &str) -> Request {
        Request::builder(Method::Post, "/api/posts").header(name, value).build()
    }

    #[rstest]
    #[case("application/json")]
    #[case("Application/JSON")]
    #[case("text/html, application/json;q=0.9")]
    #[case("application/*")]
    #[case("*/*")]
    #[case("text/plain; q=0.5, */*; q=0.1")]
    fn accepts(#[case] header: &str) {
        assert!(accept(&with_header("accept", header), JSON).is_ok());
    }

    #[rstest]
    #[case("application/xml")]
    #[case("text/*")]
    #[case("application/json;q=0")]
    #[case("application/json; q=nonsense")]
    #[case("")]
    #[case("json")]
    fn rejects(#[case] header: &str) {
        let err = accept(&with_header("accept", header), JSON).unwrap_err();
        assert_eq!(err.to_string(), "Request must accept application/json data");
    }

    #[test]
    fn missing_accept_is_rejected() {
        let req = Request::builder(Method::Get, "/").build();
        assert!(matches!(accept(&req, JSON), Err(ApiError::NotAcceptable(JSON))));
    }

    #[rstest]
    #[case("application/json", true)]
    #[case("application/json; charset=utf-8", true)]
    #[case("APPLICATION/JSON", true)]
    #[case("application/xml", false)]
    #[case("application/json-patch+json", false)]
    fn requires(#[case] header: &str, #[case] ok: bool) {
        assert_eq!(require(&with_header("content-type", header), JSON).is_ok(), ok);
    }

    #[test]
    fn missing_content_type_is_rejected() {
        let req = Request::builder(Method::Post, "/").build();
        let err = require(&req, JSON).unwrap_err();
        assert_eq!(err.to_string(), "Request must contain application/json data");
    }
}
