//! Modelo de Auto
//!
//! Este módulo contiene el struct Auto con sus sub-registros (Zulassung,
//! Ausstattung) y el enum de categorías. Mapea al schema PostgreSQL de
//! `migrations/`.

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;

/// Categoría del auto - mapea al ENUM autoart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, Enum, PartialEq, Eq, Hash)]
#[sqlx(type_name = "autoart", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutoArt {
    Suv,
    Cabrio,
    Limousine,
    EAuto,
    Kombi,
    Pickup,
    Crossover,
}

impl AutoArt {
    pub const ALL: [AutoArt; 7] = [
        AutoArt::Suv,
        AutoArt::Cabrio,
        AutoArt::Limousine,
        AutoArt::EAuto,
        AutoArt::Kombi,
        AutoArt::Pickup,
        AutoArt::Crossover,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoArt::Suv => "SUV",
            AutoArt::Cabrio => "CABRIO",
            AutoArt::Limousine => "LIMOUSINE",
            AutoArt::EAuto => "E_AUTO",
            AutoArt::Kombi => "KOMBI",
            AutoArt::Pickup => "PICKUP",
            AutoArt::Crossover => "CROSSOVER",
        }
    }
}

impl fmt::Display for AutoArt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error al convertir un string en `AutoArt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAutoArt(pub String);

impl FromStr for AutoArt {
    type Err = InvalidAutoArt;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AutoArt::ALL
            .into_iter()
            .find(|art| art.as_str() == s)
            .ok_or_else(|| InvalidAutoArt(s.to_string()))
    }
}

/// Zulassung (1:1) del auto
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Zulassung {
    pub identifikations_nummer: String,
    pub erstzulassung: NaiveDate,
    pub gueltig_bis: Option<NaiveDate>,
}

/// Elemento de equipamiento (1:n) del auto
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ausstattung {
    pub bezeichnung: String,
    pub beschreibung: Option<String>,
    pub preis: Decimal,
}

/// Auto principal con sus sub-registros
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Auto {
    pub id: i32,
    pub version: i32,
    pub fin: String,
    pub rating: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub verfuegbar: bool,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Option<Vec<String>>,
    pub zulassung: Option<Zulassung>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ausstattungen: Option<Vec<Ausstattung>>,
    pub erzeugt: Option<DateTime<Utc>>,
    pub aktualisiert: Option<DateTime<Utc>>,
}

/// Fila de `auto` con la Zulassung unida (LEFT JOIN)
#[derive(Debug, Clone, FromRow)]
pub struct AutoRow {
    pub id: i32,
    pub version: i32,
    pub fin: String,
    pub rating: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub verfuegbar: bool,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Option<Vec<String>>,
    pub erzeugt: Option<DateTime<Utc>>,
    pub aktualisiert: Option<DateTime<Utc>>,
    pub identifikations_nummer: Option<String>,
    pub erstzulassung: Option<NaiveDate>,
    pub gueltig_bis: Option<NaiveDate>,
}

impl From<AutoRow> for Auto {
    fn from(row: AutoRow) -> Self {
        let zulassung = match (row.identifikations_nummer, row.erstzulassung) {
            (Some(identifikations_nummer), Some(erstzulassung)) => Some(Zulassung {
                identifikations_nummer,
                erstzulassung,
                gueltig_bis: row.gueltig_bis,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            version: row.version,
            fin: row.fin,
            rating: row.rating,
            art: row.art,
            preis: row.preis,
            rabatt: row.rabatt,
            verfuegbar: row.verfuegbar,
            baujahr: row.baujahr,
            homepage: row.homepage,
            schlagwoerter: row.schlagwoerter,
            zulassung,
            ausstattungen: None,
            erzeugt: row.erzeugt,
            aktualisiert: row.aktualisiert,
        }
    }
}

/// Datos de un auto nuevo, ya validados y normalizados
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuto {
    pub fin: String,
    pub rating: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub verfuegbar: bool,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
    pub zulassung: Zulassung,
    pub ausstattungen: Vec<Ausstattung>,
}

/// Campos escalares que reescribe una actualización
#[derive(Debug, Clone, PartialEq)]
pub struct AutoUpdate {
    pub fin: String,
    pub rating: i32,
    pub art: Option<AutoArt>,
    pub preis: Decimal,
    pub rabatt: Option<Decimal>,
    pub verfuegbar: bool,
    pub baujahr: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub schlagwoerter: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_art_from_str() {
        assert_eq!("E_AUTO".parse::<AutoArt>(), Ok(AutoArt::EAuto));
        assert_eq!("SUV".parse::<AutoArt>(), Ok(AutoArt::Suv));
        assert!("suv".parse::<AutoArt>().is_err());
        assert!("TRAKTOR".parse::<AutoArt>().is_err());
    }

    #[test]
    fn test_auto_art_serde() {
        assert_eq!(serde_json::to_string(&AutoArt::EAuto).unwrap(), "\"E_AUTO\"");
        let art: AutoArt = serde_json::from_str("\"PICKUP\"").unwrap();
        assert_eq!(art, AutoArt::Pickup);
    }

    #[test]
    fn test_row_without_zulassung() {
        let row = AutoRow {
            id: 1,
            version: 0,
            fin: "HUN12345678923451".into(),
            rating: 4,
            art: None,
            preis: Decimal::ONE,
            rabatt: None,
            verfuegbar: true,
            baujahr: None,
            homepage: None,
            schlagwoerter: None,
            erzeugt: None,
            aktualisiert: None,
            identifikations_nummer: None,
            erstzulassung: None,
            gueltig_bis: None,
        };
        let auto = Auto::from(row);
        assert!(auto.zulassung.is_none());
        assert!(auto.ausstattungen.is_none());
    }
}
