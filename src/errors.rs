use serde::Serialize;
use thiserror::Error;

/// Унифицированное описание ошибки для вывода наружу (replay-драйвер, логи)
#[derive(Serialize)]
pub struct ErrorResponse<'a> {
    pub code: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Ошибки отдельного поля. Текст ошибки показывается пользователю рядом с полем.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,

    #[error("Name/Last Name must contain only letters (A-Z, Lithuanian).")]
    NamePattern,

    #[error("Enter a valid email address (e.g., user@example.com).")]
    EmailPattern,

    /// Телефон заполнен частично (проверка при вводе)
    #[error("Phone number is too short or incomplete.")]
    PhoneTooShort,

    /// Телефон заполнен частично (проверка при потере фокуса)
    #[error("Phone number is incomplete.")]
    PhoneIncomplete,
}

impl FieldError {
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::Required => "REQUIRED",
            FieldError::NamePattern => "NAME_PATTERN",
            FieldError::EmailPattern => "EMAIL_PATTERN",
            FieldError::PhoneTooShort | FieldError::PhoneIncomplete => "PHONE_INCOMPLETE",
        }
    }
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Please correct the errors marked in the form.")]
    SubmitBlocked,

    #[error("Submission {0} is still being processed")]
    SubmissionInFlight(uuid::Uuid),

    #[error("Unknown submission: {0}")]
    UnknownSubmission(uuid::Uuid),

    #[error("Missing control: {0}")]
    MissingControl(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    pub fn code(&self) -> &'static str {
        match self {
            FormError::SubmitBlocked => "SUBMIT_BLOCKED",
            FormError::SubmissionInFlight(_) => "SUBMISSION_IN_FLIGHT",
            FormError::UnknownSubmission(_) => "UNKNOWN_SUBMISSION",
            FormError::MissingControl(_) => "MISSING_CONTROL",
            FormError::Config(_) => "CONFIG_ERROR",
            FormError::Json(_) => "JSON_ERROR",
            FormError::Io(_) => "IO_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse<'static> {
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details: None,
        }
    }
}
