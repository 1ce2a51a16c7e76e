//! DTOs de entrada y salida de la API REST/GraphQL

pub mod auto_dto;
pub mod page_dto;
