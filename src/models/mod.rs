//! Modelos del sistema
//! 
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL de `migrations/`.

pub mod auto;
pub mod auto_file;
