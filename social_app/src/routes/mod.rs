mod profile_routes;
mod search_routes;

use crate::app::App;

use axum::routing::Router;
use entrait::Impl;

/// Axum API router for the real app.
pub fn api_router() -> axum::Router {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(search_routes::SearchRoutes::<Impl<App>>::router())
            .merge(profile_routes::ProfileRoutes::<Impl<App>>::router()),
    )
}
