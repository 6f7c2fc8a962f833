use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::form::fields::{FieldId, RatingSlot};

/// Клавиша из события keydown. Сериализуется как значение `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    Tab,
    Home,
    End,
    Character(char),
    Other(String),
}

impl Key {
    /// Клавиши удаления, которые могут повредить префикс
    pub fn is_deletion_or_left(&self) -> bool {
        matches!(self, Key::Backspace | Key::Delete | Key::ArrowLeft)
    }

    /// Клавиши, разрешённые при полностью заполненном номере
    pub fn allowed_when_complete(&self) -> bool {
        matches!(
            self,
            Key::Backspace
                | Key::Delete
                | Key::ArrowLeft
                | Key::ArrowRight
                | Key::Tab
                | Key::Home
                | Key::End
        )
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Tab" => Key::Tab,
            "Home" => Key::Home,
            "End" => Key::End,
            _ => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(value),
                }
            }
        }
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::ArrowLeft => "ArrowLeft".to_string(),
            Key::ArrowRight => "ArrowRight".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Home => "Home".to_string(),
            Key::End => "End".to_string(),
            Key::Character(c) => c.to_string(),
            Key::Other(name) => name,
        }
    }
}

/// Событие, поступающее в форму. Таймерные события порождаются самим драйвером.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    Input { field: FieldId, value: String },
    Blur { field: FieldId },
    PhoneInput { value: String, cursor: usize },
    PhoneKeyDown {
        key: Key,
        #[serde(default)]
        cursor: Option<usize>,
    },
    PhoneFocus,
    PhoneBlur,
    SliderInput { slot: RatingSlot, value: String },
    Submit,
    ProcessingElapsed { submission: Uuid },
    SuccessNoticeElapsed { submission: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timer {
    Processing { submission: Uuid },
    SuccessNotice { submission: Uuid },
}

impl Timer {
    /// Событие, которое таймер отправит в форму по истечении задержки
    pub fn into_event(self) -> FormEvent {
        match self {
            Timer::Processing { submission } => FormEvent::ProcessingElapsed { submission },
            Timer::SuccessNotice { submission } => FormEvent::SuccessNoticeElapsed { submission },
        }
    }
}

/// Побочный эффект, который должен применить исполнитель (браузер, драйвер)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// preventDefault для keydown
    SuppressKey,
    SetCursor { position: usize },
    Schedule {
        timer: Timer,
        #[serde(with = "duration_ms")]
        delay: Duration,
    },
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
