//! Middleware layer.
//!
//! Cross-cutting pieces that run around or before handler logic:
//!
//! - [`negotiation`] — `Accept` / `Content-Type` guards, called first thing
//!   in a handler and bailing out with `?`.
//! - [`trace`] — per-request span with method, path, status and latency,
//!   applied by the server around every dispatch.

pub mod negotiation;
pub mod trace;
