use serde::Serialize;

use crate::services::pagination::{Pageable, Slice};

// Response paginada para listados de autos
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

// Metadatos de la página
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> PageResponse<T> {
    pub fn from_slice(slice: Slice<T>, pageable: &Pageable) -> Self {
        let size = i64::from(pageable.size);
        let total_pages = if size == 0 {
            0
        } else {
            (slice.total_elements + size - 1) / size
        };

        Self {
            content: slice.content,
            page: PageMeta {
                size: pageable.size,
                number: pageable.number,
                total_elements: slice.total_elements,
                total_pages,
            },
        }
    }
}

// Response para `?only=count`
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
