//! Per-request tracing.
//!
//! Every dispatch runs inside a `request` span carrying the method and path.
//! When the response is ready, one event records the status and latency.
//! Server errors log at `error`, client errors at `warn`, the rest at `info`.
//!
//! The span wraps the whole dispatch, including rejections that happen before
//! routing (unknown methods, unreadable or oversized bodies).

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, error, info, info_span, warn};

use crate::response::Response;

/// Runs `dispatch` inside a request span for `method` and `path`.
pub async fn traced<F>(method: &str, path: &str, dispatch: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", method = %method, path = %path);

    async move {
        let started = Instant::now();
        let res = dispatch.await;
        let status = res.code().as_u16();
        let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        if res.code().is_server_error() {
            error!(status, latency_us, "request failed");
        } else if res.code().is_client_error() {
            warn!(status, latency_us, "request rejected");
        } else {
            info!(status, latency_us, "request served");
        }
        res
    }
    .instrument(span)
    .await
}
