//! Conexión a PostgreSQL y migraciones
//! 
//! El schema y los datos iniciales viven en `migrations/` y se aplican con
//! el migrador de SQLx al arrancar.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Abrir el pool y comprobar la conexión
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    info!(url = %mask_database_url(&config.url), "🔌 Conectando a PostgreSQL");
    let pool = config
        .create_pool()
        .await
        .with_context(|| format!("No se pudo conectar a {}", mask_database_url(&config.url)))?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("La base de datos no responde")?;

    info!("✅ Conexión a la base de datos establecida");
    Ok(pool)
}

/// Aplicar las migraciones pendientes (schema y seed)
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Error aplicando migraciones")?;
    info!("✅ Migraciones aplicadas");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    match url.rfind('@') {
        Some(at_pos) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
