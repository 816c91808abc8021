//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the store answer? Failure → pulled from load-balancer. |
//!
//! Both are registered by [`api::router`](crate::api::router).

use http::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::request::Request;
use crate::response::Response;
use crate::store::SharedStore;

/// Liveness probe. Always `200 {"status": "ok"}`; works for any router state.
pub async fn liveness<S: Send>(_req: Request, _state: S) -> Response {
    Response::json(&json!({"status": "ok"}))
}

/// Readiness probe. Issues a point read against the store and answers
/// `503` if the store errors.
pub async fn readiness(_req: Request, store: SharedStore) -> Response {
    match store.get(0).await {
        Ok(_) => Response::json(&json!({"status": "ready"})),
        Err(e) => {
            warn!(error = %e, "readiness probe failed");
            Response::builder()
                .status(StatusCode::SERVICE_UNAVAILABLE)
                .json(&json!({"status": "unavailable"}))
        }
    }
}
