//! Paginación
//!
//! Convierte `page`/`size` de la request en offset/limit para el store y
//! envuelve los resultados con el total sin paginar.

use serde::Serialize;

pub const DEFAULT_PAGE_NUMBER: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Página solicitada (número de página empezando en 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    pub number: u32,
    pub size: u32,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pageable {
    /// Crear un Pageable a partir de los strings de la query.
    /// Valores no numéricos vuelven al valor por defecto; el tamaño se
    /// limita a `MAX_PAGE_SIZE` y un tamaño 0 se trata como no indicado.
    pub fn from_params(number: Option<&str>, size: Option<&str>) -> Self {
        let number = number
            .and_then(|n| n.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_NUMBER);

        let size = match size.and_then(|s| s.trim().parse::<u32>().ok()) {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(s) => s.min(MAX_PAGE_SIZE),
        };

        Self { number, size }
    }

    /// Primera página con el tamaño máximo permitido
    pub fn max() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: MAX_PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Resultados de una página y el total de registros sin paginar
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Pageable::from_params(None, None), Pageable::default());
        assert_eq!(Pageable::default().offset(), 0);
        assert_eq!(Pageable::default().limit(), 5);
    }

    #[test]
    fn test_offset_is_page_times_size() {
        let pageable = Pageable::from_params(Some("3"), Some("20"));
        assert_eq!(pageable.offset(), 60);
        assert_eq!(pageable.limit(), 20);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let pageable = Pageable::from_params(Some("-1"), Some("abc"));
        assert_eq!(pageable, Pageable::default());

        let pageable = Pageable::from_params(Some("1"), Some("0"));
        assert_eq!(pageable.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_size_is_capped() {
        let pageable = Pageable::from_params(None, Some("5000"));
        assert_eq!(pageable.size, MAX_PAGE_SIZE);
    }
}
