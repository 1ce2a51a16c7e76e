//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del servicio de autos
//! y su conversión a respuestas HTTP y a errores GraphQL.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::utils::validation::flatten_validation_errors;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Datenbankfehler: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ungueltige Daten: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Die FIN {0} existiert bereits.")]
    FinExists(String),

    #[error("Die Versionsnummer {0} ist ungueltig.")]
    VersionInvalid(String),

    #[error("Die Versionsnummer {0} ist nicht aktuell.")]
    VersionOutdated(i32),

    #[error("Header \"If-Match\" fehlt")]
    PreconditionRequired,

    #[error("Nicht unterstuetzter Dateityp: {0}")]
    UnsupportedMediaType(String),

    #[error("Datei zu gross: {0}")]
    PayloadTooLarge(String),

    #[error("Ungueltige Anfrage: {0}")]
    BadRequest(String),

    #[error("Interner Fehler: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código HTTP asociado a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FinExists(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::VersionInvalid(_) | AppError::VersionOutdated(_) => {
                StatusCode::PRECONDITION_FAILED
            }
            AppError::PreconditionRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Código estable expuesto en el cuerpo de error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::FinExists(_) => "FIN_EXISTS",
            AppError::VersionInvalid(_) => "VERSION_INVALID",
            AppError::VersionOutdated(_) => "VERSION_OUTDATED",
            AppError::PreconditionRequired => "PRECONDITION_REQUIRED",
            AppError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = Some(self.code().to_string());

        let error_response = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "❌ Database error");
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "Beim Zugriff auf die Datenbank ist ein Fehler aufgetreten".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Validation(messages) => {
                tracing::debug!(?messages, "Validation error");
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "Die uebermittelten Daten sind ungueltig".to_string(),
                    details: Some(json!(messages)),
                    code,
                }
            }

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "❌ Internal error");
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "Ein unerwarteter Fehler ist aufgetreten".to_string(),
                    details: None,
                    code,
                }
            }

            other => {
                tracing::debug!(error = %other, status = status.as_u16(), "Request rejected");
                ErrorResponse {
                    error: status
                        .canonical_reason()
                        .unwrap_or("Error")
                        .to_string(),
                    message: other.to_string(),
                    details: None,
                    code,
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} mit der ID {} nicht gefunden", resource, id))
}
