//! Interfaz GraphQL
//!
//! Schema con las queries `auto`/`autos` y las mutations `create`, `update`
//! y `delete`, más los handlers de Axum que lo sirven.

pub mod resolvers;

use async_graphql::{
    http::GraphiQLSource, EmptySubscription, Error, ErrorExtensions, Schema,
};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::middleware::auth::AuthenticatedUser;
use crate::services::auto_read_service::AutoReadService;
use crate::services::auto_write_service::AutoWriteService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub use resolvers::{MutationRoot, QueryRoot};

pub type AutoSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

pub fn build_schema(
    read_service: Arc<AutoReadService>,
    write_service: Arc<AutoWriteService>,
) -> AutoSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(read_service)
        .data(write_service)
        .finish()
}

/// Errores de dominio como errores GraphQL con `extensions.code`
impl ErrorExtensions for AppError {
    fn extend(&self) -> Error {
        let (message, code) = match self {
            AppError::Forbidden(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                (msg.clone(), BAD_USER_INPUT)
            }
            AppError::Validation(messages) => (messages.join("; "), BAD_USER_INPUT),
            AppError::Database(e) => {
                tracing::error!(error = %e, "❌ Database error");
                (e.to_string(), INTERNAL_SERVER_ERROR)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "❌ Internal error");
                (msg.clone(), INTERNAL_SERVER_ERROR)
            }
            other => (other.to_string(), BAD_USER_INPUT),
        };

        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// POST /graphql
pub async fn graphql_handler(
    State(state): State<AppState>,
    user: Option<AuthenticatedUser>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let request = match user {
        Some(user) => request.data(user),
        None => request,
    };
    Json(state.schema.execute(request).await)
}

/// GET /graphql: GraphiQL fuera de producción
pub async fn graphiql(State(state): State<AppState>) -> Response {
    if state.config.is_production() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
}
