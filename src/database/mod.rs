//! Módulo de base de datos
//! 
//! Conexión inicial, migraciones y seed de PostgreSQL

pub mod connection;

pub use connection::{connect, mask_database_url, run_migrations};
