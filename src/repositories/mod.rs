pub mod auto_repository;
#[cfg(test)]
pub mod memory_repository;

pub use auto_repository::{AutoStore, PgAutoRepository};
