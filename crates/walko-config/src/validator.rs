//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_api(config, &mut result);
        Self::validate_visitor(config, &mut result);
        Self::validate_render(config, &mut result);

        Ok(result)
    }

    fn validate_api(config: &Config, result: &mut ValidationResult) {
        let url = &config.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "api.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.api.token.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "api.token",
                "token is not set, requests will be rejected by the content service",
            ));
        }

        if config.api.source.is_empty() {
            result.add_error(ValidationError::new("api.source", "source cannot be empty"));
        }
    }

    fn validate_visitor(config: &Config, result: &mut ValidationResult) {
        if let Some(locale) = config.visitor.user_locale.as_deref() {
            if crate::locale::normalize_locale(locale).is_none() {
                result.add_warning(ValidationWarning::new(
                    "visitor.user_locale",
                    format!("Unsupported locale '{}', content falls back to browser language", locale),
                ));
            }
        }
    }

    fn validate_render(config: &Config, result: &mut ValidationResult) {
        let render = &config.render;
        if !render.viewport_margin.is_finite() || render.viewport_margin < 0.0 {
            result.add_error(ValidationError::new(
                "render.viewport_margin",
                "viewport_margin must be a non-negative number",
            ));
        }

        if !render.estimated_card_height.is_finite() || render.estimated_card_height <= 0.0 {
            result.add_error(ValidationError::new(
                "render.estimated_card_height",
                "estimated_card_height must be greater than 0",
            ));
        }

        if render.retry_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "render.retry_delay_ms",
                "retry_delay_ms is 0, late-mounting elements will rarely be found",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
