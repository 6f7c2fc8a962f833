use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::form::fields::{FieldId, RatingSlot};

pub const PHONE_KEY: &str = "phone";

/// Снимок значений формы на момент отправки
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub data: BTreeMap<String, String>,
}

impl Submission {
    pub fn new(data: BTreeMap<String, String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            data,
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.data.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn field(&self, id: FieldId) -> &str {
        self.get(id.key())
    }

    pub fn rating(&self, slot: RatingSlot) -> &str {
        self.get(slot.key())
    }

    pub fn rating_average(&self) -> RatingAverage {
        let ratings: Vec<&str> = RatingSlot::ALL.iter().map(|slot| self.rating(*slot)).collect();
        RatingAverage::of(&ratings)
    }
}

/// Средняя оценка. Пустое значение означает, что ни одна оценка не разобралась.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingAverage(Option<f64>);

impl RatingAverage {
    pub fn of(values: &[&str]) -> Self {
        let parsed: Vec<i64> = values.iter().filter_map(|v| parse_rating(v)).collect();
        if parsed.is_empty() {
            return Self(None);
        }

        let total: i128 = parsed.iter().map(|&n| i128::from(n)).sum();
        let mean = total as f64 / parsed.len() as f64;
        Self(Some((mean * 10.0).round() / 10.0))
    }

    pub fn value(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl fmt::Display for RatingAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(avg) => write!(f, "{:.1}", avg),
            None => write!(f, "0"),
        }
    }
}

/// Разбирает ведущее целое число, как parseInt: "7abc" -> 7, "abc" -> None.
pub fn parse_rating(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let rest = trimmed
        .strip_prefix(['-', '+'])
        .unwrap_or(trimmed);
    let sign_len = trimmed.len() - rest.len();

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    trimmed[..sign_len + digits_end].parse::<i64>().ok()
}

/// HTML-блок с отправленными данными; оценки выводятся как `N / max_rating`
pub fn render_summary(submission: &Submission, max_rating: u8) -> String {
    let first = escape_html(submission.field(FieldId::FirstName));
    let last = escape_html(submission.field(FieldId::LastName));
    let average = submission.rating_average();

    let mut html = String::from("<h4>Submitted Details:</h4>");
    html.push_str("<p>");
    html.push_str(&format!("<strong>Name:</strong> {} <br>", first));
    html.push_str(&format!("<strong>Last Name:</strong> {} <br>", last));
    html.push_str(&format!(
        "<strong>Email:</strong> {} <br>",
        escape_html(submission.field(FieldId::Email))
    ));
    html.push_str(&format!(
        "<strong>Phone Number:</strong> {} <br>",
        escape_html(submission.get(PHONE_KEY))
    ));
    html.push_str(&format!(
        "<strong>Address:</strong> {} <br>",
        escape_html(submission.field(FieldId::Address))
    ));
    html.push_str("<br>");
    for slot in RatingSlot::ALL {
        html.push_str(&format!(
            "<strong>{}:</strong> {} / {} <br>",
            slot.label(),
            escape_html(submission.rating(slot)),
            max_rating
        ));
    }
    html.push_str("<br>");
    html.push_str("<strong>Overall Average Rating:</strong> <br>");
    html.push_str(&format!(
        "<span style=\"font-size: 1.2em; font-weight: bold;\">{} {}: {}</span>",
        first, last, average
    ));
    html.push_str("</p>");

    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
