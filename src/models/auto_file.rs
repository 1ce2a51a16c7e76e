//! Modelo de AutoFile
//!
//! Archivo binario adjunto a un auto (como máximo uno por auto).

use serde::Serialize;
use sqlx::FromRow;

/// Archivo completo, con el contenido en bytes
#[derive(Debug, Clone, FromRow)]
pub struct AutoFile {
    pub id: i32,
    pub auto_id: i32,
    pub filename: String,
    pub mimetype: String,
    pub data: Vec<u8>,
}

/// Metadatos del archivo, sin contenido
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoFileMeta {
    pub id: i32,
    pub auto_id: i32,
    pub filename: String,
    pub mimetype: String,
    pub size: i64,
}

/// Archivo a guardar, con el tipo MIME ya detectado
#[derive(Debug, Clone)]
pub struct NewAutoFile {
    pub filename: String,
    pub mimetype: String,
    pub data: Vec<u8>,
}

impl From<&AutoFile> for AutoFileMeta {
    fn from(file: &AutoFile) -> Self {
        Self {
            id: file.id,
            auto_id: file.auto_id,
            filename: file.filename.clone(),
            mimetype: file.mimetype.clone(),
            size: file.data.len() as i64,
        }
    }
}
