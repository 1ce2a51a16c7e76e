//! Services module
//! 
//! Este módulo contiene la lógica de negocio: lectura y escritura de autos,
//! construcción de filtros y paginación. Los servicios acceden a los datos
//! solo a través de `AutoStore`.

pub mod auto_read_service;
pub mod auto_write_service;
pub mod pagination;
pub mod query_builder;

pub use auto_read_service::AutoReadService;
pub use auto_write_service::AutoWriteService;
