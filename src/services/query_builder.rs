//! Construcción de filtros de búsqueda
//!
//! Traduce los parámetros planos de una búsqueda (incluidos los flags de
//! Schlagwörter) en un `AutoFilter` estructurado. El repositorio lo convierte
//! después en SQL. Aquí no se accede a la base de datos.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::models::auto::AutoArt;

/// Parámetros de búsqueda: nombre -> valor, tal como llegan en la query
pub type SearchParams = BTreeMap<String, String>;

pub const IDENTIFIKATIONS_NUMMER: &str = "identifikationsNummer";
pub const FIN: &str = "fin";
pub const RATING: &str = "rating";
pub const PREIS: &str = "preis";
pub const ART: &str = "art";
pub const VERFUEGBAR: &str = "verfuegbar";
pub const LIEFERBAR: &str = "lieferbar";
pub const BAUJAHR: &str = "baujahr";
pub const DATUM: &str = "datum";
pub const HOMEPAGE: &str = "homepage";

/// Parámetros de comparación reconocidos
pub const SEARCH_PARAMS: &[&str] = &[
    IDENTIFIKATIONS_NUMMER,
    FIN,
    RATING,
    PREIS,
    ART,
    VERFUEGBAR,
    LIEFERBAR,
    BAUJAHR,
    DATUM,
    HOMEPAGE,
];

/// Flags booleanos y el Schlagwort que exigen
pub const TAG_FLAGS: &[(&str, &str)] = &[
    ("allrad", "ALLRAD"),
    ("sport", "SPORT"),
    ("suv", "SUV"),
    ("familie", "FAMILIE"),
    ("e_auto", "E-AUTO"),
    ("vier_x_vier", "4x4"),
    ("kombi", "KOMBI"),
    ("cabrio", "CABRIO"),
    ("limousine", "LIMOUSINE"),
    ("pickup", "PICKUP"),
    ("crossover", "CROSSOVER"),
    ("hybrid", "HYBRID"),
    ("diesel", "DIESEL"),
    ("benzin", "BENZIN"),
    ("elektro", "ELEKTRO"),
    ("automatik", "AUTOMATIK"),
    ("luxus", "LUXUS"),
    ("kompakt", "KOMPAKT"),
    ("oldtimer", "OLDTIMER"),
];

/// Una condición sobre un auto
#[derive(Debug, Clone, PartialEq)]
pub enum AutoPredicate {
    /// Subcadena sin distinguir mayúsculas en la identificación de la Zulassung
    IdentifikationsNummerContains(String),
    FinEquals(String),
    RatingAtLeast(i32),
    PreisAtMost(Decimal),
    ArtEquals(AutoArt),
    VerfuegbarEquals(bool),
    BaujahrFrom(NaiveDate),
    HomepageEquals(String),
    /// Los Schlagwörter del auto contienen todos los indicados
    SchlagwoerterContainAll(Vec<String>),
}

/// Conjunción de predicados; vacía significa "todos los autos"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoFilter {
    pub predicates: Vec<AutoPredicate>,
}

impl AutoFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

pub fn is_tag_flag(name: &str) -> bool {
    TAG_FLAGS.iter().any(|(flag, _)| *flag == name)
}

/// Nombre aceptado por la búsqueda (comparación o flag)
pub fn is_known_param(name: &str) -> bool {
    SEARCH_PARAMS.contains(&name) || is_tag_flag(name)
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Construir el filtro. Nombres desconocidos y valores numéricos o de fecha
/// no interpretables se ignoran.
pub fn build_filter(params: &SearchParams) -> AutoFilter {
    let mut predicates = Vec::new();

    for (name, value) in params {
        let predicate = match name.as_str() {
            IDENTIFIKATIONS_NUMMER => {
                Some(AutoPredicate::IdentifikationsNummerContains(value.clone()))
            }
            FIN => Some(AutoPredicate::FinEquals(value.clone())),
            RATING => value.trim().parse().ok().map(AutoPredicate::RatingAtLeast),
            PREIS => Decimal::from_str(value.trim())
                .ok()
                .map(AutoPredicate::PreisAtMost),
            ART => value.parse().ok().map(AutoPredicate::ArtEquals),
            VERFUEGBAR | LIEFERBAR => Some(AutoPredicate::VerfuegbarEquals(is_true(value))),
            BAUJAHR | DATUM => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .ok()
                .map(AutoPredicate::BaujahrFrom),
            HOMEPAGE => Some(AutoPredicate::HomepageEquals(value.clone())),
            _ => None,
        };

        if let Some(predicate) = predicate {
            predicates.push(predicate);
        }
    }

    let schlagwoerter: Vec<String> = TAG_FLAGS
        .iter()
        .filter(|(flag, _)| params.get(*flag).is_some_and(|value| is_true(value)))
        .map(|(_, schlagwort)| schlagwort.to_string())
        .collect();

    if !schlagwoerter.is_empty() {
        predicates.push(AutoPredicate::SchlagwoerterContainAll(schlagwoerter));
    }

    AutoFilter { predicates }
}
