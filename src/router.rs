//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router also owns the
//! application state handed to every handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup with the shared state, register routes, and pass
/// it to [`Server::serve`](crate::Server::serve). Each registration returns
/// `self` so calls chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: S,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self { routes: HashMap::new(), state }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with a registered route.
    /// Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Put, path, handler)
    }

    /// Routes one request to its handler and awaits the response.
    ///
    /// Misses render as JSON: `404` when no method knows the path, `405` when
    /// some other method does.
    pub async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req, self.state.clone()).await
            }
            None if self.allowed_elsewhere(req.method, &req.path) => ApiError::MethodNotAllowed {
                method: req.method.to_string(),
                path: req.path,
            }
            .into_response(),
            None => ApiError::no_route(req.method, &req.path).into_response(),
        }
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn allowed_elsewhere(&self, method: Method, path: &str) -> bool {
        Method::ALL.into_iter()
            .filter(|m| *m != method)
            .filter_map(|m| self.routes.get(&m))
            .any(|tree| tree.at(path).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    async fn echo_id(req: Request, prefix: &'static str) -> Response {
        Response::json(&format!("{prefix}{}", req.param("id").unwrap_or("?")))
    }

    fn router() -> Router<&'static str> {
        Router::new("post-").get("/things/{id}", echo_id)
    }

    #[tokio::test]
    async fn passes_params_and_state() {
        let res = router().handle(Request::builder(Method::Get, "/things/9").build()).await;
        assert_eq!(res.code(), StatusCode::OK);
        assert_eq!(res.body(), br#""post-9""#);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let res = router().handle(Request::builder(Method::Get, "/nothing").build()).await;
        assert_eq!(res.code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), br#"{"message":"No route for GET /nothing"}"#);
    }

    #[tokio::test]
    async fn known_path_wrong_method_is_405() {
        let res = router().handle(Request::builder(Method::Delete, "/things/1").build()).await;
        assert_eq!(res.code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.body(), br#"{"message":"Method DELETE not allowed for /things/1"}"#);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = router().get("/things/{other}", echo_id);
    }
}
