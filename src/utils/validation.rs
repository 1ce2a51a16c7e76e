//! Utilidades de validación
//!
//! Este módulo contiene las expresiones regulares y funciones helper
//! que usan los DTOs de autos con `validator`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

lazy_static! {
    /// FIN: 17 caracteres alfanuméricos sin I, O ni Q
    pub static ref FIN_REGEX: Regex = Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").unwrap();

    /// Identificación de la Zulassung, p.ej. `M-AB1234`
    pub static ref IDENTIFIKATIONS_NUMMER_REGEX: Regex =
        Regex::new(r"^[A-Z]{1,3}-[A-Z]{1,3}[0-9]{1,4}$").unwrap();

    /// Versión en cabeceras `If-Match`: número de 1 a 3 dígitos entre comillas
    pub static ref VERSION_REGEX: Regex = Regex::new(r#"^"(\d{1,3})"$"#).unwrap();
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        error.message = Some("muss groesser oder gleich 0 sein".into());
        return Err(error);
    }
    Ok(())
}

/// Precio de un auto o de una Ausstattung
pub fn validate_preis(preis: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*preis)
}

/// Rabatt como fracción en [0, 1)
pub fn validate_rabatt(rabatt: &Decimal) -> Result<(), ValidationError> {
    if *rabatt < Decimal::ZERO || *rabatt >= Decimal::ONE {
        let mut error = ValidationError::new("rabatt");
        error.add_param("value".into(), rabatt);
        error.message = Some("muss zwischen 0 und 1 liegen".into());
        return Err(error);
    }
    Ok(())
}

/// Schlagwörter vacíos no se aceptan
pub fn validate_schlagwoerter(schlagwoerter: &[String]) -> Result<(), ValidationError> {
    if schlagwoerter.iter().any(|s| s.trim().is_empty()) {
        let mut error = ValidationError::new("schlagwoerter");
        error.message = Some("darf keine leeren Schlagwoerter enthalten".into());
        return Err(error);
    }
    Ok(())
}

/// Convierte `ValidationErrors` en una lista plana `"<ruta>: <mensaje>"`,
/// una entrada por campo inválido. La ruta usa los nombres JSON (camelCase).
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let field = to_camel_case(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

/// `identifikations_nummer` -> `identifikationsNummer`
pub fn to_camel_case(field: &str) -> String {
    let mut camel = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !camel.is_empty();
        } else if upper {
            camel.extend(c.to_uppercase());
            upper = false;
        } else {
            camel.push(c);
        }
    }
    camel
}

/// Extrae el número de versión de un valor `"<n>"`
pub fn parse_version(raw: &str) -> Option<i32> {
    VERSION_REGEX
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
