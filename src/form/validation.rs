//! Предикаты валидации текстовых полей формы.
//! Не трогают состояние формы, поэтому годятся и для агрегированной проверки.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::FieldError;

lazy_static::lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-ZĄČĘĖĮŠŲŪŽa-ząčęėįšųūž\s'-]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Семантический тип поля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Email,
    Address,
}

pub fn validate_name(value: &str) -> bool {
    NAME_RE.is_match(value)
}

pub fn validate_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Проверяет значение поля; пробелы по краям не учитываются.
pub fn check(value: &str, kind: FieldKind) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required);
    }

    match kind {
        FieldKind::Name if !validate_name(value) => Err(FieldError::NamePattern),
        FieldKind::Email if !validate_email(value) => Err(FieldError::EmailPattern),
        _ => Ok(()),
    }
}
