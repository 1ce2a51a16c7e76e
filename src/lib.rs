//! Servicio de autos
//!
//! CRUD de autos con Zulassung, Ausstattungen y un archivo adjunto, expuesto
//! por REST y GraphQL sobre PostgreSQL.

pub mod config;
pub mod database;
pub mod dto;
pub mod graphql;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
