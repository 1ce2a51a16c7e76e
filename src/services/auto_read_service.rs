//! Servicio de lectura de autos
//!
//! Búsqueda por id, búsqueda con filtros (paginada o completa), conteo y lectura del
//! archivo adjunto. "Sin resultados" se informa como `AppError::NotFound`.

use std::sync::Arc;
use tracing::{debug, Instrument, Span};

use crate::models::auto::{Auto, AutoArt};
use crate::models::auto_file::AutoFile;
use crate::repositories::auto_repository::AutoStore;
use crate::services::pagination::{Pageable, Slice};
use crate::services::query_builder::{build_filter, is_known_param, SearchParams, ART};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct AutoReadService {
    store: Arc<dyn AutoStore>,
    span: Span,
}

impl AutoReadService {
    pub fn new(store: Arc<dyn AutoStore>, span: Span) -> Self {
        Self { store, span }
    }

    /// Buscar un auto por id, opcionalmente con sus Ausstattungen
    pub async fn find_by_id(&self, id: i32, mit_ausstattungen: bool) -> AppResult<Auto> {
        async {
            debug!(id, mit_ausstattungen, "find_by_id");
            let mut auto = self
                .store
                .find_by_id(id, mit_ausstattungen)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Es gibt kein Auto mit der ID {}.", id)))?;

            auto.schlagwoerter.get_or_insert_with(Vec::new);
            debug!(id, version = auto.version, fin = %auto.fin, "Auto gefunden");
            Ok(auto)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Buscar autos. Sin parámetros devuelve todos, paginados.
    pub async fn find(
        &self,
        params: Option<&SearchParams>,
        pageable: Pageable,
    ) -> AppResult<Slice<Auto>> {
        async {
            debug!(?params, ?pageable, "find");
            let empty = SearchParams::new();
            let params = params.unwrap_or(&empty);

            if !params.is_empty() {
                self.check_params(params)?;
            }

            let filter = build_filter(params);
            let (mut content, total_elements) = self
                .store
                .find(&filter, pageable.limit(), pageable.offset())
                .await?;

            if content.is_empty() {
                debug!(?params, page = pageable.number, "Keine Autos gefunden");
                return Err(AppError::NotFound(format!(
                    "Keine Autos gefunden: {:?}, Seite {}",
                    params, pageable.number
                )));
            }

            for auto in &mut content {
                auto.schlagwoerter.get_or_insert_with(Vec::new);
            }
            debug!(count = content.len(), total_elements, "Autos gefunden");
            Ok(Slice {
                content,
                total_elements,
            })
        }
        .instrument(self.span.clone())
        .await
    }

    /// Buscar todos los autos que cumplen los criterios, sin paginar
    pub async fn find_all(&self, params: Option<&SearchParams>) -> AppResult<Vec<Auto>> {
        async {
            debug!(?params, "find_all");
            let empty = SearchParams::new();
            let params = params.unwrap_or(&empty);

            if !params.is_empty() {
                self.check_params(params)?;
            }

            let mut autos = self.store.find_all(&build_filter(params)).await?;
            if autos.is_empty() {
                debug!(?params, "Keine Autos gefunden");
                return Err(AppError::NotFound(format!(
                    "Keine Autos gefunden: {:?}",
                    params
                )));
            }

            for auto in &mut autos {
                auto.schlagwoerter.get_or_insert_with(Vec::new);
            }
            debug!(count = autos.len(), "Autos gefunden");
            Ok(autos)
        }
        .instrument(self.span.clone())
        .await
    }

    fn check_params(&self, params: &SearchParams) -> AppResult<()> {
        let unknown: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|name| !is_known_param(name))
            .collect();
        if !unknown.is_empty() {
            debug!(?unknown, "Ungueltige Suchparameter");
            return Err(AppError::NotFound(format!(
                "Ungueltige Suchparameter: {:?}",
                unknown
            )));
        }

        if let Some(art) = params.get(ART) {
            if art.parse::<AutoArt>().is_err() {
                debug!(art = %art, "Ungueltige Art");
                return Err(AppError::NotFound(format!("Ungueltige Art: {}", art)));
            }
        }

        Ok(())
    }

    /// Número total de autos
    pub async fn count(&self) -> AppResult<i64> {
        let count = self.store.count().instrument(self.span.clone()).await?;
        debug!(parent: &self.span, count, "count");
        Ok(count)
    }

    /// Archivo adjunto a un auto
    pub async fn find_file_by_auto_id(&self, id: i32) -> AppResult<AutoFile> {
        async {
            debug!(id, "find_file_by_auto_id");
            if self.store.find_by_id(id, false).await?.is_none() {
                return Err(not_found_error("Auto", &id.to_string()));
            }

            self.store.find_file(id).await?.ok_or_else(|| {
                AppError::NotFound(format!("Es gibt keine Datei zum Auto mit der ID {}.", id))
            })
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auto::{NewAuto, Zulassung};
    use crate::repositories::memory_repository::MemoryAutoStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tracing::info_span;

    fn service() -> AutoReadService {
        AutoReadService::new(Arc::new(MemoryAutoStore::seeded()), info_span!("test"))
    }

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let auto = service().find_by_id(1, true).await.unwrap();
        assert_eq!(auto.id, 1);
        assert!(auto.ausstattungen.is_some());
    }

    #[tokio::test]
    async fn test_find_by_id_normalizes_schlagwoerter() {
        let auto = service().find_by_id(6, false).await.unwrap();
        assert_eq!(auto.schlagwoerter, Some(vec![]));
        assert!(auto.ausstattungen.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let result = service().find_by_id(999, false).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_without_params_is_paginated() {
        let slice = service().find(None, Pageable::default()).await.unwrap();
        assert_eq!(slice.content.len(), 5);
        assert_eq!(slice.total_elements, 6);

        let slice = service()
            .find(None, Pageable { number: 1, size: 5 })
            .await
            .unwrap();
        assert_eq!(slice.content.len(), 1);
    }

    #[tokio::test]
    async fn test_page_beyond_end_is_not_found() {
        let result = service().find(None, Pageable { number: 9, size: 5 }).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rating_is_lower_bound() {
        let slice = service()
            .find(Some(&params(&[("rating", "4")])), Pageable::max())
            .await
            .unwrap();
        assert!(!slice.content.is_empty());
        assert!(slice.content.iter().all(|a| a.rating >= 4));
    }

    #[tokio::test]
    async fn test_preis_is_upper_bound() {
        let slice = service()
            .find(Some(&params(&[("preis", "40000")])), Pageable::max())
            .await
            .unwrap();
        let limit = Decimal::from_str("40000").unwrap();
        assert!(slice.content.iter().all(|a| a.preis <= limit));
        assert_eq!(slice.total_elements, 3);
    }

    #[tokio::test]
    async fn test_tag_flags_require_all_schlagwoerter() {
        let slice = service()
            .find(
                Some(&params(&[("allrad", "true"), ("sport", "true")])),
                Pageable::max(),
            )
            .await
            .unwrap();
        assert_eq!(slice.content.len(), 1);
        for auto in &slice.content {
            let schlagwoerter = auto.schlagwoerter.clone().unwrap();
            assert!(schlagwoerter.contains(&"ALLRAD".to_string()));
            assert!(schlagwoerter.contains(&"SPORT".to_string()));
        }
    }

    #[tokio::test]
    async fn test_unknown_param_is_not_found() {
        let result = service()
            .find(Some(&params(&[("foo", "bar")])), Pageable::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("foo")));
    }

    #[tokio::test]
    async fn test_invalid_art_is_not_found() {
        let result = service()
            .find(Some(&params(&[("art", "TRAKTOR")])), Pageable::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_no_match_is_not_found_with_page() {
        let result = service()
            .find(Some(&params(&[("fin", "XXX00000000000000")])), Pageable::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("Seite 0")));
    }

    #[tokio::test]
    async fn test_baujahr_is_lower_bound() {
        let from = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        for name in ["baujahr", "datum"] {
            let slice = service()
                .find(Some(&params(&[(name, "2021-01-01")])), Pageable::max())
                .await
                .unwrap();
            assert_eq!(slice.total_elements, 3);
            assert!(slice
                .content
                .iter()
                .all(|a| a.baujahr.is_some_and(|b| b >= from)));
        }
    }

    #[tokio::test]
    async fn test_identifikations_nummer_is_case_insensitive_substring() {
        let slice = service()
            .find(Some(&params(&[("identifikationsNummer", "ab")])), Pageable::max())
            .await
            .unwrap();
        assert_eq!(slice.content.len(), 1);
        assert_eq!(slice.content[0].id, 1);
        assert_eq!(
            slice.content[0].zulassung.as_ref().unwrap().identifikations_nummer,
            "M-AB1234"
        );
    }

    #[tokio::test]
    async fn test_identifikations_nummer_wildcards_are_literal() {
        let result = service()
            .find(Some(&params(&[("identifikationsNummer", "%")])), Pageable::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all_is_not_capped() {
        let store = Arc::new(MemoryAutoStore::seeded());
        for i in 0..120 {
            let auto = NewAuto {
                fin: format!("TST{:014}", i),
                rating: 3,
                art: None,
                preis: Decimal::from(10000),
                rabatt: None,
                verfuegbar: true,
                baujahr: None,
                homepage: None,
                schlagwoerter: vec![],
                zulassung: Zulassung {
                    identifikations_nummer: format!("T-{}", i),
                    erstzulassung: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    gueltig_bis: None,
                },
                ausstattungen: vec![],
            };
            store.insert(&auto).await.unwrap();
        }
        let service = AutoReadService::new(store, info_span!("test"));

        let autos = service.find_all(None).await.unwrap();
        assert_eq!(autos.len(), 126);

        let autos = service
            .find_all(Some(&params(&[("identifikationsNummer", "t-")])))
            .await
            .unwrap();
        assert_eq!(autos.len(), 120);
    }

    #[tokio::test]
    async fn test_find_all_without_match_is_not_found() {
        let result = service()
            .find_all(Some(&params(&[("fin", "XXX00000000000000")])))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = service().find_all(Some(&params(&[("foo", "bar")]))).await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("foo")));
    }

    #[tokio::test]
    async fn test_count() {
        assert_eq!(service().count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_find_file_distinguishes_missing_auto_and_file() {
        let service = service();
        let missing_auto = service.find_file_by_auto_id(999).await.unwrap_err();
        let missing_file = service.find_file_by_auto_id(1).await.unwrap_err();
        assert!(matches!(missing_auto, AppError::NotFound(_)));
        assert!(matches!(missing_file, AppError::NotFound(_)));
        assert_ne!(missing_auto.to_string(), missing_file.to_string());
    }
}
