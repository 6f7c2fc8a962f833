//! Маска телефонного номера формата `+370 6 XXX XXXXX`.
//!
//! Поле всегда начинается с фиксированного префикса; после него допускается не
//! более 8 цифр. Номер считается заполненным при длине 15 символов, keydown не
//! даёт набрать больше. Вставка полного номера (`+370 6...` или `370...`)
//! приводится к локальным цифрам.

use serde::Serialize;

use crate::errors::FieldError;
use crate::form::events::Key;
use crate::form::fields::Decoration;

pub const PHONE_PREFIX: &str = "+370 6";
/// Первая позиция курсора после префикса и разделяющего пробела
pub const MIN_CURSOR: usize = 7;
/// Длина полностью заполненного номера
pub const COMPLETE_LEN: usize = 15;

const MAX_LOCAL_DIGITS: usize = 8;
const COUNTRY_WITH_PREFIX: &str = "3706";
const COUNTRY_CODE: &str = "370";

/// Приводит произвольный текст поля к каноническому виду.
pub fn mask(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    let local = digits
        .strip_prefix(COUNTRY_WITH_PREFIX)
        .or_else(|| digits.strip_prefix(COUNTRY_CODE))
        .unwrap_or(&digits);
    let local = &local[..local.len().min(MAX_LOCAL_DIGITS)];

    let mut formatted = String::with_capacity(COMPLETE_LEN);
    formatted.push_str(PHONE_PREFIX);

    if !local.is_empty() {
        formatted.push(' ');
        if local.len() > 3 {
            formatted.push_str(&local[..3]);
            formatted.push(' ');
            formatted.push_str(&local[3..]);
        } else {
            formatted.push_str(local);
        }
    }

    formatted
}

pub fn is_complete(value: &str) -> bool {
    value.chars().count() == COMPLETE_LEN
}

/// Результат обработки keydown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub suppress: bool,
    pub cursor: Option<usize>,
}

/// Состояние поля телефона. Значение меняется только через методы маски.
#[derive(Debug, Clone, Serialize)]
pub struct PhoneInput {
    value: String,
    cursor: usize,
    focused: bool,
    pub decoration: Decoration,
    pub error: String,
}

impl Default for PhoneInput {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneInput {
    pub fn new() -> Self {
        Self {
            value: PHONE_PREFIX.to_string(),
            cursor: PHONE_PREFIX.len(),
            focused: false,
            decoration: Decoration::Neutral,
            error: String::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_complete(&self) -> bool {
        is_complete(&self.value)
    }

    /// Обрабатывает событие input: `raw` уже содержит набранный текст, `cursor` -
    /// позиция курсора в нём. Возвращает новую позицию курсора, если поле в фокусе.
    pub fn apply_input(&mut self, raw: &str, cursor: usize) -> Option<usize> {
        let previous_len = raw.chars().count();
        self.value = mask(raw);
        let new_len = self.len();

        let shifted = (cursor as isize + new_len as isize - previous_len as isize).max(0) as usize;
        let position = shifted.max(MIN_CURSOR).min(new_len);
        log::debug!(
            "phone masked: {:?} -> {:?}, cursor {} -> {}",
            raw,
            self.value,
            cursor,
            position
        );

        self.annotate_progress();

        if self.focused {
            self.cursor = position;
            Some(position)
        } else {
            None
        }
    }

    /// Фильтр keydown: не даёт стереть префикс и переполнить поле.
    pub fn key_down(&mut self, key: &Key, cursor: Option<usize>) -> KeyOutcome {
        if let Some(cursor) = cursor {
            self.cursor = cursor;
        }

        let mut outcome = KeyOutcome::default();

        if key.is_deletion_or_left() && self.cursor <= MIN_CURSOR {
            outcome.suppress = true;
            if *key == Key::ArrowLeft {
                self.cursor = MIN_CURSOR.min(self.len());
                outcome.cursor = Some(self.cursor);
            }
        }

        if self.len() >= COMPLETE_LEN && !key.allowed_when_complete() {
            outcome.suppress = true;
        }

        outcome
    }

    /// При фокусе обрезанное поле восстанавливается до префикса, курсор ставится в конец.
    pub fn focus(&mut self) -> usize {
        self.focused = true;
        if self.value.trim().chars().count() < MIN_CURSOR {
            self.value = PHONE_PREFIX.to_string();
        }
        self.cursor = self.len();
        self.cursor
    }

    pub fn blur(&mut self) {
        self.focused = false;
        let len = self.len();

        if len > MIN_CURSOR && len < COMPLETE_LEN {
            self.mark_invalid(FieldError::PhoneIncomplete);
        } else if self.value.trim().chars().count() <= MIN_CURSOR {
            self.clear_decoration();
        }
    }

    /// Возврат к пустому префиксу (после отправки формы)
    pub fn reset(&mut self) {
        let focused = self.focused;
        *self = Self::new();
        self.focused = focused;
    }

    fn annotate_progress(&mut self) {
        let len = self.len();
        if len == COMPLETE_LEN {
            self.decoration = Decoration::Valid;
            self.error.clear();
        } else if len > MIN_CURSOR {
            self.mark_invalid(FieldError::PhoneTooShort);
        } else {
            self.clear_decoration();
        }
    }

    fn mark_invalid(&mut self, err: FieldError) {
        self.decoration = Decoration::Invalid;
        self.error = err.to_string();
    }

    fn clear_decoration(&mut self) {
        self.decoration = Decoration::Neutral;
        self.error.clear();
    }
}
