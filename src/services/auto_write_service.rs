//! Servicio de escritura de autos
//!
//! Alta con comprobación de FIN, actualización con control optimista de
//! versiones, borrado y adjuntar archivos.

use std::sync::Arc;
use tracing::{debug, info, Instrument, Span};

use crate::models::auto::{AutoUpdate, NewAuto};
use crate::models::auto_file::{AutoFileMeta, NewAutoFile};
use crate::repositories::auto_repository::AutoStore;
use crate::services::auto_read_service::AutoReadService;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::parse_version;

const FALLBACK_MIMETYPE: &str = "application/octet-stream";

/// Tipos MIME aceptados al subir un archivo
pub const ALLOWED_MIMETYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "application/pdf",
    "video/mp4",
];

pub fn is_allowed_mimetype(mimetype: &str) -> bool {
    ALLOWED_MIMETYPES.contains(&mimetype)
}

/// Datos de una actualización: id, campos nuevos y la versión del cliente
/// tal como llegó (`"<n>"`)
#[derive(Debug, Clone)]
pub struct UpdateParams<'a> {
    pub id: i32,
    pub auto: AutoUpdate,
    pub version: &'a str,
}

pub struct AutoWriteService {
    store: Arc<dyn AutoStore>,
    read_service: Arc<AutoReadService>,
    span: Span,
}

impl AutoWriteService {
    pub fn new(store: Arc<dyn AutoStore>, read_service: Arc<AutoReadService>, span: Span) -> Self {
        Self {
            store,
            read_service,
            span,
        }
    }

    /// Crear un auto nuevo y devolver su id
    pub async fn create(&self, auto: NewAuto) -> AppResult<i32> {
        async {
            debug!(fin = %auto.fin, "create");
            // Comprobación y alta no son atómicas; la restricción UNIQUE del
            // store cubre la carrera entre dos altas con la misma FIN.
            if self.store.count_by_fin(&auto.fin).await? > 0 {
                debug!(fin = %auto.fin, "FIN existiert bereits");
                return Err(AppError::FinExists(auto.fin));
            }

            let id = self.store.insert(&auto).await?;
            info!(id, fin = %auto.fin, "Auto angelegt");
            Ok(id)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Actualizar los campos escalares. Acepta cualquier versión que no sea
    /// menor que la almacenada y devuelve la nueva versión.
    pub async fn update(&self, params: UpdateParams<'_>) -> AppResult<i32> {
        async {
            let UpdateParams { id, auto, version } = params;
            debug!(id, version, "update");

            let version = parse_version(version)
                .ok_or_else(|| AppError::VersionInvalid(version.to_string()))?;

            let stored = self.read_service.find_by_id(id, false).await?;
            if version < stored.version {
                debug!(id, version, stored = stored.version, "Versionsnummer veraltet");
                return Err(AppError::VersionOutdated(version));
            }

            let new_version = self
                .store
                .update(id, &auto, stored.version)
                .await?
                .ok_or_else(|| {
                    debug!(id, version, "Konkurrierende Aenderung");
                    AppError::VersionOutdated(version)
                })?;

            info!(id, version = new_version, "Auto aktualisiert");
            Ok(new_version)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Borrar un auto. `false` si no existía.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        async {
            debug!(id, "delete");
            if self.store.find_by_id(id, false).await?.is_none() {
                return Ok(false);
            }

            let deleted = self.store.delete(id).await?;
            info!(id, deleted, "Auto geloescht");
            Ok(deleted)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Adjuntar un archivo a un auto, reemplazando el anterior. El tipo MIME
    /// se detecta del contenido, no del Content-Type del cliente, y tiene que
    /// estar en `ALLOWED_MIMETYPES`.
    pub async fn add_file(
        &self,
        auto_id: i32,
        data: Vec<u8>,
        filename: String,
    ) -> AppResult<AutoFileMeta> {
        async {
            debug!(auto_id, filename = %filename, size = data.len(), "add_file");
            if self.store.find_by_id(auto_id, false).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Es gibt kein Auto mit der ID {}.",
                    auto_id
                )));
            }

            let (mimetype, data) = sniff_mimetype(data).await?;
            debug!(auto_id, mimetype = %mimetype, "MIME-Type erkannt");
            if !is_allowed_mimetype(&mimetype) {
                debug!(auto_id, mimetype = %mimetype, "Dateityp abgelehnt");
                return Err(AppError::UnsupportedMediaType(mimetype));
            }

            let meta = self
                .store
                .replace_file(
                    auto_id,
                    NewAutoFile {
                        filename,
                        mimetype,
                        data,
                    },
                )
                .await?;

            info!(auto_id, file_id = meta.id, mimetype = %meta.mimetype, "Datei gespeichert");
            Ok(meta)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Detectar el tipo MIME a partir de los magic bytes
pub async fn sniff_mimetype(data: Vec<u8>) -> AppResult<(String, Vec<u8>)> {
    tokio::task::spawn_blocking(move || {
        let mimetype = infer::get(&data)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| FALLBACK_MIMETYPE.to_string());
        (mimetype, data)
    })
    .await
    .map_err(|e| AppError::Internal(format!("MIME sniffing failed: {}", e)))
}
