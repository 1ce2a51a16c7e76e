pub mod auto_routes;
pub mod health_routes;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::graphql::{graphiql, graphql_handler};
use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Router completo: REST bajo /rest, GraphQL bajo /graphql y health checks
pub fn create_app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_middleware(&state.config));

    Router::new()
        .nest(
            "/rest",
            auto_routes::create_auto_router(state.config.max_file_size),
        )
        .route("/graphql", get(graphiql).post(graphql_handler))
        .nest("/health", health_routes::create_health_router())
        .layer(middleware)
        .with_state(state)
}
