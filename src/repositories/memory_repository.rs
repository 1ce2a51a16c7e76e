//! `AutoStore` en memoria para los tests de servicios y rutas.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Mutex;

use crate::models::auto::{Auto, AutoArt, AutoUpdate, Ausstattung, NewAuto, Zulassung};
use crate::models::auto_file::{AutoFile, AutoFileMeta, NewAutoFile};
use crate::repositories::auto_repository::AutoStore;
use crate::services::query_builder::{AutoFilter, AutoPredicate};
use crate::utils::errors::AppError;

#[derive(Default)]
struct Tables {
    autos: Vec<Auto>,
    files: Vec<AutoFile>,
    next_auto_id: i32,
    next_file_id: i32,
}

#[derive(Default)]
pub struct MemoryAutoStore {
    tables: Mutex<Tables>,
}

fn matches(predicate: &AutoPredicate, auto: &Auto) -> bool {
    match predicate {
        AutoPredicate::IdentifikationsNummerContains(value) => auto
            .zulassung
            .as_ref()
            .is_some_and(|z| {
                z.identifikations_nummer
                    .to_lowercase()
                    .contains(&value.to_lowercase())
            }),
        AutoPredicate::FinEquals(fin) => &auto.fin == fin,
        AutoPredicate::RatingAtLeast(rating) => auto.rating >= *rating,
        AutoPredicate::PreisAtMost(preis) => auto.preis <= *preis,
        AutoPredicate::ArtEquals(art) => auto.art == Some(*art),
        AutoPredicate::VerfuegbarEquals(verfuegbar) => auto.verfuegbar == *verfuegbar,
        AutoPredicate::BaujahrFrom(baujahr) => auto.baujahr.is_some_and(|b| b >= *baujahr),
        AutoPredicate::HomepageEquals(homepage) => auto.homepage.as_ref() == Some(homepage),
        AutoPredicate::SchlagwoerterContainAll(required) => {
            let schlagwoerter = auto.schlagwoerter.clone().unwrap_or_default();
            required.iter().all(|s| schlagwoerter.contains(s))
        }
    }
}

impl MemoryAutoStore {
    fn filtered(&self, filter: &AutoFilter) -> Vec<Auto> {
        let tables = self.tables.lock().unwrap();
        tables
            .autos
            .iter()
            .filter(|auto| filter.predicates.iter().all(|p| matches(p, auto)))
            .cloned()
            .map(|mut auto| {
                auto.ausstattungen = None;
                auto
            })
            .collect()
    }

    /// Store con los autos de ejemplo de la migración seed
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().unwrap();
            let seed: [(&str, i32, Option<AutoArt>, &str, bool, &[&str], &str); 6] = [
                ("WVW12345678901234", 4, Some(AutoArt::Suv), "45999.99", true, &["SUV", "ALLRAD", "FAMILIE"], "M-AB1234"),
                ("HYU12398765412TUC", 2, Some(AutoArt::Limousine), "21500", false, &["KOMPAKT"], "HH-XY12"),
                ("TSL98765432109876", 5, Some(AutoArt::EAuto), "52990", true, &["E-AUTO", "SPORT", "ALLRAD"], "B-EA7"),
                ("BMW11122233344455", 3, Some(AutoArt::Cabrio), "38750.5", true, &["SPORT", "CABRIO"], "S-CB99"),
                ("FRD55566677788899", 1, Some(AutoArt::Pickup), "31000", false, &["4x4", "ALLRAD"], "K-PU4444"),
                ("VLV00011122233344", 4, Some(AutoArt::Kombi), "42100", true, &[], "F-KO12"),
            ];
            for (index, (fin, rating, art, preis, verfuegbar, schlagwoerter, kennzeichen)) in
                seed.into_iter().enumerate()
            {
                tables.autos.push(Auto {
                    id: index as i32 + 1,
                    version: 0,
                    fin: fin.to_string(),
                    rating,
                    art,
                    preis: Decimal::from_str(preis).unwrap(),
                    rabatt: None,
                    verfuegbar,
                    baujahr: NaiveDate::from_ymd_opt(2018 + index as i32, 1, 1),
                    homepage: Some(format!("https://auto{}.example.com", index + 1)),
                    schlagwoerter: if schlagwoerter.is_empty() {
                        None
                    } else {
                        Some(schlagwoerter.iter().map(|s| s.to_string()).collect())
                    },
                    zulassung: Some(Zulassung {
                        identifikations_nummer: kennzeichen.to_string(),
                        erstzulassung: NaiveDate::from_ymd_opt(2018 + index as i32, 2, 1).unwrap(),
                        gueltig_bis: None,
                    }),
                    ausstattungen: Some(vec![Ausstattung {
                        bezeichnung: "Navi".into(),
                        beschreibung: None,
                        preis: Decimal::from(500),
                    }]),
                    erzeugt: Some(Utc::now()),
                    aktualisiert: Some(Utc::now()),
                });
            }
            tables.next_auto_id = 7;
            tables.next_file_id = 1;
        }
        store
    }
}

#[async_trait]
impl AutoStore for MemoryAutoStore {
    async fn find_by_id(&self, id: i32, mit_ausstattungen: bool) -> Result<Option<Auto>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.autos.iter().find(|a| a.id == id).cloned().map(|mut auto| {
            if !mit_ausstattungen {
                auto.ausstattungen = None;
            }
            auto
        }))
    }

    async fn find(
        &self,
        filter: &AutoFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Auto>, i64), AppError> {
        let matching = self.filtered(filter);
        let total = matching.len() as i64;
        let content = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((content, total))
    }

    async fn find_all(&self, filter: &AutoFilter) -> Result<Vec<Auto>, AppError> {
        Ok(self.filtered(filter))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.tables.lock().unwrap().autos.len() as i64)
    }

    async fn count_by_fin(&self, fin: &str) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.autos.iter().filter(|a| a.fin == fin).count() as i64)
    }

    async fn insert(&self, auto: &NewAuto) -> Result<i32, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_auto_id.max(1);
        tables.next_auto_id = id + 1;
        tables.autos.push(Auto {
            id,
            version: 0,
            fin: auto.fin.clone(),
            rating: auto.rating,
            art: auto.art,
            preis: auto.preis,
            rabatt: auto.rabatt,
            verfuegbar: auto.verfuegbar,
            baujahr: auto.baujahr,
            homepage: auto.homepage.clone(),
            schlagwoerter: Some(auto.schlagwoerter.clone()),
            zulassung: Some(auto.zulassung.clone()),
            ausstattungen: Some(auto.ausstattungen.clone()),
            erzeugt: Some(Utc::now()),
            aktualisiert: Some(Utc::now()),
        });
        Ok(id)
    }

    async fn update(
        &self,
        id: i32,
        update: &AutoUpdate,
        expected_version: i32,
    ) -> Result<Option<i32>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(auto) = tables
            .autos
            .iter_mut()
            .find(|a| a.id == id && a.version == expected_version)
        else {
            return Ok(None);
        };

        auto.version += 1;
        auto.fin = update.fin.clone();
        auto.rating = update.rating;
        auto.art = update.art;
        auto.preis = update.preis;
        auto.rabatt = update.rabatt;
        auto.verfuegbar = update.verfuegbar;
        auto.baujahr = update.baujahr;
        auto.homepage = update.homepage.clone();
        auto.schlagwoerter = Some(update.schlagwoerter.clone());
        auto.aktualisiert = Some(Utc::now());
        Ok(Some(auto.version))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.autos.len();
        tables.autos.retain(|a| a.id != id);
        tables.files.retain(|f| f.auto_id != id);
        Ok(tables.autos.len() < before)
    }

    async fn find_file(&self, auto_id: i32) -> Result<Option<AutoFile>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.files.iter().find(|f| f.auto_id == auto_id).cloned())
    }

    async fn replace_file(&self, auto_id: i32, file: NewAutoFile) -> Result<AutoFileMeta, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.files.retain(|f| f.auto_id != auto_id);
        let id = tables.next_file_id.max(1);
        tables.next_file_id = id + 1;
        let stored = AutoFile {
            id,
            auto_id,
            filename: file.filename,
            mimetype: file.mimetype,
            data: file.data,
        };
        let meta = AutoFileMeta::from(&stored);
        tables.files.push(stored);
        Ok(meta)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
