//! Autenticación JWT
//!
//! Los tokens los emite el proveedor de identidad externo; aquí solo se
//! verifican y se extraen el usuario y sus roles.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::EnvironmentConfig, state::AppState, utils::errors::AppError};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub const FORBIDDEN_RESOURCE: &str = "Forbidden resource";
pub const TOKEN_REQUIRED: &str = "Authorization-Header mit Bearer-Token erforderlich";

/// Roles del realm dentro del token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Usuario autenticado que se extrae de la request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.roles.iter().any(|r| roles.contains(&r.as_str()))
    }

    /// `Forbidden` si el usuario no tiene ninguno de los roles
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            Ok(())
        } else {
            tracing::debug!(username = %self.username, ?roles, "Rolle fehlt");
            Err(AppError::Forbidden(FORBIDDEN_RESOURCE.to_string()))
        }
    }
}

/// Verificar y decodificar un token Bearer
pub fn verify_token(token: &str, config: &EnvironmentConfig) -> Result<AuthenticatedUser, AppError> {
    let mut validation = Validation::default();
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &validation,
    )
    .map_err(|e| AppError::Unauthorized(format!("Ungueltiges Token: {}", e)))?;

    let claims = token_data.claims;
    Ok(AuthenticatedUser {
        username: claims.preferred_username.unwrap_or(claims.sub),
        roles: claims.realm_access.roles,
    })
}

/// Extraer el token del header Authorization
pub fn extract_bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts)
            .ok_or_else(|| AppError::Unauthorized(TOKEN_REQUIRED.to_string()))?;

        verify_token(token, &state.config)
    }
}

/// Generar un token firmado (solo para tests)
#[cfg(test)]
pub fn test_token(username: &str, roles: &[&str], secret: &str) -> String {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        preferred_username: Some(username.to_string()),
        realm_access: RealmAccess {
            roles: roles.iter().map(|r| r.to_string()).collect(),
        },
        exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .unwrap()
}
