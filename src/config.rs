use serde::Deserialize;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Сколько длится имитация обработки отправки
    pub processing_delay_ms: u64,
    /// Через сколько скрывается уведомление об успехе
    pub success_notice_ms: u64,
    pub default_rating: u8,
    pub max_rating: u8,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 1500,
            success_notice_ms: 3000,
            default_rating: 5,
            max_rating: 10,
        }
    }
}

impl FormConfig {
    /// Читает FORM_* переменные окружения (и .env), недостающие значения берутся по умолчанию.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(config::Environment::with_prefix("FORM"))
    }

    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        let cfg = config::Config::builder()
            .set_default("processing_delay_ms", defaults.processing_delay_ms)?
            .set_default("success_notice_ms", defaults.success_notice_ms)?
            .set_default("default_rating", defaults.default_rating as u64)?
            .set_default("max_rating", defaults.max_rating as u64)?
            .add_source(source)
            .build()?;

        let config: FormConfig = cfg.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn success_notice_delay(&self) -> Duration {
        Duration::from_millis(self.success_notice_ms)
    }

    pub fn default_rating_value(&self) -> String {
        self.default_rating.to_string()
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        for (name, value) in [
            ("processing_delay_ms", self.processing_delay_ms),
            ("success_notice_ms", self.success_notice_ms),
        ] {
            if value == 0 || value > MAX_DELAY_MS {
                return Err(config::ConfigError::Message(format!(
                    "{} must be between 1 and {} ms",
                    name, MAX_DELAY_MS
                )));
            }
        }

        if self.max_rating == 0 {
            return Err(config::ConfigError::Message(
                "max_rating must be positive".to_string(),
            ));
        }

        if !(1..=self.max_rating).contains(&self.default_rating) {
            return Err(config::ConfigError::Message(format!(
                "default_rating must be between 1 and {}",
                self.max_rating
            )));
        }

        Ok(())
    }
}
