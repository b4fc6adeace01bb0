use serde::Deserialize;

use crate::error::AppError;

fn default_groq_api_base() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_completion_model() -> String {
    "llama-3.1-8b-instant".into()
}

fn default_http_bind() -> String {
    "0.0.0.0".into()
}

fn default_http_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "static".into()
}

fn default_template_dir() -> String {
    "templates".into()
}

fn default_max_reviews_per_call() -> usize {
    50
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_relaxed_json() -> bool {
    false
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// Process-wide settings, read once from the environment at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub groq_api_key: String,
    #[serde(default = "default_groq_api_base")]
    pub groq_api_base: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
    /// Upper bound of reviews embedded in one prompt; `0` sends everything at once.
    #[serde(default = "default_max_reviews_per_call")]
    pub max_reviews_per_call: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_relaxed_json")]
    pub relaxed_json: bool,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            groq_api_base: default_groq_api_base(),
            completion_model: default_completion_model(),
            http_bind: default_http_bind(),
            http_port: default_http_port(),
            static_dir: default_static_dir(),
            template_dir: default_template_dir(),
            max_reviews_per_call: default_max_reviews_per_call(),
            request_timeout_secs: default_request_timeout_secs(),
            relaxed_json: default_relaxed_json(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Settings {
    /// Load the settings from the process environment and validate them.
    pub fn new() -> Result<Self, AppError> {
        let settings: Settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The provider credential is the only mandatory value.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.groq_api_key.trim().is_empty() {
            return Err(AppError::Config(
                "The GROQ_API_KEY environment variable is missing or empty.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.http_port, 3000);
        assert_eq!(settings.completion_model, "llama-3.1-8b-instant");
        assert_eq!(settings.max_reviews_per_call, 50);
        assert!(!settings.relaxed_json);
    }

    #[test]
    fn empty_key_is_rejected() {
        let settings = Settings {
            groq_api_key: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn new_reads_environment() {
        std::env::set_var("GROQ_API_KEY", "gsk_env");
        std::env::set_var("MAX_REVIEWS_PER_CALL", "7");
        let settings = Settings::new().unwrap();
        assert_eq!(settings.groq_api_key, "gsk_env");
        assert_eq!(settings.max_reviews_per_call, 7);
        std::env::remove_var("GROQ_API_KEY");
        std::env::remove_var("MAX_REVIEWS_PER_CALL");
    }

    #[test]
    fn present_key_is_accepted() {
        let settings = Settings {
            groq_api_key: "gsk_test".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }
}
