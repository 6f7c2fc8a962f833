use serde::{Deserialize, Serialize};

use crate::errors::FieldError;
use crate::form::validation::FieldKind;

/// Оформление поля (аналог классов is-valid / is-invalid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FirstName,
    LastName,
    Email,
    Address,
}

impl FieldId {
    /// Ключ поля в снимке отправленных данных
    pub fn key(&self) -> &'static str {
        match self {
            FieldId::FirstName => "first_name",
            FieldId::LastName => "last_name",
            FieldId::Email => "email",
            FieldId::Address => "address",
        }
    }

    pub const fn kind(&self) -> FieldKind {
        match self {
            FieldId::FirstName | FieldId::LastName => FieldKind::Name,
            FieldId::Email => FieldKind::Email,
            FieldId::Address => FieldKind::Address,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub id: FieldId,
    pub kind: FieldKind,
}

/// Поля, участвующие в валидации и в агрегированной проверке формы
pub const VALIDATED_FIELDS: [FieldSpec; 4] = [
    FieldSpec { id: FieldId::FirstName, kind: FieldKind::Name },
    FieldSpec { id: FieldId::LastName, kind: FieldKind::Name },
    FieldSpec { id: FieldId::Email, kind: FieldKind::Email },
    FieldSpec { id: FieldId::Address, kind: FieldKind::Address },
];

/// Текстовое поле вместе с его сообщением об ошибке
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldControl {
    pub value: String,
    pub decoration: Decoration,
    pub error: String,
}

impl FieldControl {
    pub fn annotate(&mut self, result: &Result<(), FieldError>) {
        match result {
            Ok(()) => {
                self.decoration = Decoration::Valid;
                self.error.clear();
            }
            Err(err) => {
                self.decoration = Decoration::Invalid;
                self.error = err.to_string();
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSlot {
    Design,
    Clarity,
    Impression,
}

impl RatingSlot {
    pub const ALL: [RatingSlot; 3] = [RatingSlot::Design, RatingSlot::Clarity, RatingSlot::Impression];

    pub fn key(&self) -> &'static str {
        match self {
            RatingSlot::Design => "rating1",
            RatingSlot::Clarity => "rating2",
            RatingSlot::Impression => "rating3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingSlot::Design => "1. Website Design Rating",
            RatingSlot::Clarity => "2. Clarity of Information Rating",
            RatingSlot::Impression => "3. Overall Impression Rating",
        }
    }
}

/// Слайдер оценки и его элемент отображения значения (если он есть на странице)
#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub value: String,
    pub display: Option<String>,
}

impl Slider {
    pub fn new(value: String, has_display: bool) -> Self {
        let display = has_display.then(|| value.clone());
        Self { value, display }
    }

    pub fn set(&mut self, value: String) {
        if let Some(display) = self.display.as_mut() {
            display.clone_from(&value);
        }
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_sets_and_clears_error_text() {
        let mut control = FieldControl::default();
        control.annotate(&Err(FieldError::Required));
        assert_eq!(control.decoration, Decoration::Invalid);
        assert_eq!(control.error, "This field is required.");

        control.annotate(&Ok(()));
        assert_eq!(control.decoration, Decoration::Valid);
        assert!(control.error.is_empty());
    }

    #[test]
    fn slider_keeps_display_in_sync() {
        let mut slider = Slider::new("5".to_string(), true);
        slider.set("8".to_string());
        assert_eq!(slider.display.as_deref(), Some("8"));

        let mut hidden = Slider::new("5".to_string(), false);
        hidden.set("3".to_string());
        assert_eq!(hidden.value, "3");
        assert!(hidden.display.is_none());
    }

    #[test]
    fn validated_fields_agree_with_field_kinds() {
        for spec in VALIDATED_FIELDS {
            assert_eq!(spec.id.kind(), spec.kind);
        }
    }
}
