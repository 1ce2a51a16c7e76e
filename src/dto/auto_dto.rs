use async_graphql::InputObject;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::auto::{AutoArt, AutoUpdate, Ausstattung, NewAuto, Zulassung};
use crate::utils::validation::{
    validate_preis, validate_rabatt, validate_schlagwoerter, FIN_REGEX,
    IDENTIFIKATIONS_NUMMER_REGEX,
};

/// Escala fija del precio
pub const PREIS_SCALE: u32 = 6;
/// Escala fija del Rabatt
pub const RABATT_SCALE: u32 = 4;

// Request para crear un auto con Zulassung y Ausstattungen
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "AutoInput")]
pub struct AutoDto {
    #[validate(regex(path = "FIN_REGEX", message = "ist keine gueltige FIN"))]
    pub fin: String,

    #[validate(range(min = 0, max = 5, message = "muss zwischen 0 und 5 liegen"))]
    pub rating: i32,

    pub art: Option<AutoArt>,

    #[validate(custom = "validate_preis")]
    pub preis: Decimal,

    #[validate(custom = "validate_rabatt")]
    pub rabatt: Option<Decimal>,

    #[serde(default)]
    #[graphql(default)]
    pub verfuegbar: bool,

    pub baujahr: Option<NaiveDate>,

    #[validate(url(message = "ist keine gueltige URL"))]
    pub homepage: Option<String>,

    #[validate(custom = "validate_schlagwoerter")]
    pub schlagwoerter: Option<Vec<String>>,

    #[validate]
    pub zulassung: ZulassungDto,

    #[validate]
    #[serde(default)]
    #[graphql(default)]
    pub ausstattungen: Vec<AusstattungDto>,
}

// Zulassung dentro del request de creación
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "ZulassungInput")]
pub struct ZulassungDto {
    #[validate(regex(
        path = "IDENTIFIKATIONS_NUMMER_REGEX",
        message = "ist keine gueltige Identifikationsnummer"
    ))]
    pub identifikations_nummer: String,

    pub erstzulassung: NaiveDate,

    pub gueltig_bis: Option<NaiveDate>,
}

// Ausstattung dentro del request de creación
#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "AusstattungInput")]
pub struct AusstattungDto {
    #[validate(length(min = 1, max = 32, message = "muss 1 bis 32 Zeichen lang sein"))]
    pub bezeichnung: String,

    #[validate(length(max = 128, message = "darf hoechstens 128 Zeichen lang sein"))]
    pub beschreibung: Option<String>,

    #[validate(custom = "validate_preis")]
    pub preis: Decimal,
}

// Request para actualizar los campos escalares de un auto
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AutoUpdateDto {
    #[validate(regex(path = "FIN_REGEX", message = "ist keine gueltige FIN"))]
    pub fin: String,

    #[validate(range(min = 0, max = 5, message = "muss zwischen 0 und 5 liegen"))]
    pub rating: i32,

    pub art: Option<AutoArt>,

    #[validate(custom = "validate_preis")]
    pub preis: Decimal,

    #[validate(custom = "validate_rabatt")]
    pub rabatt: Option<Decimal>,

    #[serde(default)]
    pub verfuegbar: bool,

    pub baujahr: Option<NaiveDate>,

    #[validate(url(message = "ist keine gueltige URL"))]
    pub homepage: Option<String>,

    #[validate(custom = "validate_schlagwoerter")]
    pub schlagwoerter: Option<Vec<String>>,
}

/// Elimina Schlagwörter repetidos conservando el primer orden de aparición
pub fn dedupe_schlagwoerter(schlagwoerter: Option<Vec<String>>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for schlagwort in schlagwoerter.unwrap_or_default() {
        let schlagwort = schlagwort.trim().to_string();
        if !unique.contains(&schlagwort) {
            unique.push(schlagwort);
        }
    }
    unique
}

impl From<AutoDto> for NewAuto {
    fn from(dto: AutoDto) -> Self {
        Self {
            fin: dto.fin,
            rating: dto.rating,
            art: dto.art,
            preis: dto.preis.round_dp(PREIS_SCALE),
            rabatt: dto.rabatt.map(|r| r.round_dp(RABATT_SCALE)),
            verfuegbar: dto.verfuegbar,
            baujahr: dto.baujahr,
            homepage: dto.homepage,
            schlagwoerter: dedupe_schlagwoerter(dto.schlagwoerter),
            zulassung: Zulassung {
                identifikations_nummer: dto.zulassung.identifikations_nummer,
                erstzulassung: dto.zulassung.erstzulassung,
                gueltig_bis: dto.zulassung.gueltig_bis,
            },
            ausstattungen: dto
                .ausstattungen
                .into_iter()
                .map(|a| Ausstattung {
                    bezeichnung: a.bezeichnung,
                    beschreibung: a.beschreibung,
                    preis: a.preis.round_dp(PREIS_SCALE),
                })
                .collect(),
        }
    }
}

impl From<AutoUpdateDto> for AutoUpdate {
    fn from(dto: AutoUpdateDto) -> Self {
        Self {
            fin: dto.fin,
            rating: dto.rating,
            art: dto.art,
            preis: dto.preis.round_dp(PREIS_SCALE),
            rabatt: dto.rabatt.map(|r| r.round_dp(RABATT_SCALE)),
            verfuegbar: dto.verfuegbar,
            baujahr: dto.baujahr,
            homepage: dto.homepage,
            schlagwoerter: dedupe_schlagwoerter(dto.schlagwoerter),
        }
    }
}
