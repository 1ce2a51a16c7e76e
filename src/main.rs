use anyhow::Result;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use dotenvy::dotenv;

use auto_service::config::{DatabaseConfig, EnvironmentConfig};
use auto_service::database;
use auto_service::repositories::PgAutoRepository;
use auto_service::routes::create_app;
use auto_service::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚗 Auto Service - REST y GraphQL");
    info!("================================");

    // Inicializar base de datos
    let db_config = DatabaseConfig::from_env()?;
    let pool = match database::connect(&db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };

    if config.db_migrate {
        database::run_migrations(&pool).await?;
    } else {
        info!("Migraciones desactivadas (DB_MIGRATE=false)");
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let graphiql = !config.is_production();
    let app_state = AppState::new(Arc::new(PgAutoRepository::new(pool)), config);
    let app = create_app(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /rest            - Buscar autos (page, size, only=count)");
    info!("   GET    /rest/:id        - Auto por id (ETag / If-None-Match)");
    info!("   GET    /rest/file/:id   - Archivo del auto");
    info!("   POST   /rest            - Crear auto");
    info!("   POST   /rest/:id        - Subir archivo (multipart)");
    info!("   PUT    /rest/:id        - Actualizar auto (If-Match)");
    info!("   DELETE /rest/:id        - Borrar auto");
    info!("   POST   /graphql         - GraphQL");
    if graphiql {
        info!("   GET    /graphql         - GraphiQL");
    }
    info!("   GET    /health/liveness, /health/readiness");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
