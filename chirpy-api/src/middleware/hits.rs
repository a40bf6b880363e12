/// File server hit counting middleware
///
/// Wraps the `/app` static file service and bumps the shared
/// [`HitCounter`] once per request, whatever the response.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, Router};
/// use chirpy_api::{metrics::HitCounter, middleware::hits::count_hits};
/// use tower_http::services::ServeDir;
///
/// let hits = Arc::new(HitCounter::new());
/// let app: Router = Router::new()
///     .nest_service("/app", ServeDir::new("."))
///     .layer(middleware::from_fn_with_state(hits, count_hits));
/// ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::metrics::HitCounter;

/// Increments the hit counter, then forwards the request
pub async fn count_hits(State(hits): State<Arc<HitCounter>>, req: Request, next: Next) -> Response {
    let total = hits.increment();
    tracing::trace!(total, path = %req.uri().path(), "File server hit");

    next.run(req).await
}
