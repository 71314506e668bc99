//! Configuration validation.

use crate::schema::{Config, MANDATED_PARAM_KEYS};

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
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_base_url(config, &mut result);
        Self::validate_base_params(config, &mut result);
        Self::validate_timeouts(config, &mut result);
        result
    }

    fn validate_base_url(config: &Config, result: &mut ValidationResult) {
        let base_url = &config.client.base_url;
        if base_url.is_empty() {
            result.add_error(ValidationError::new(
                "client.base_url",
                "Base URL cannot be empty",
            ));
            return;
        }

        match url::Url::parse(base_url) {
            Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => {
                result.add_error(ValidationError::new(
                    "client.base_url",
                    format!("Unsupported scheme '{}', expected http or https", parsed.scheme()),
                ));
            }
            Ok(_) => {}
            Err(e) => {
                result.add_error(ValidationError::new("client.base_url", e.to_string()));
            }
        }

        if base_url.ends_with('/') {
            result.add_warning(ValidationWarning::new(
                "client.base_url",
                "Trailing slash is stripped before call paths are appended",
            ));
        }
    }

    fn validate_base_params(config: &Config, result: &mut ValidationResult) {
        for key in MANDATED_PARAM_KEYS {
            if config.client.base_params.contains_key(key) {
                result.add_warning(ValidationWarning::new(
                    format!("client.base_params.{}", key),
                    "Overrides a parameter the client generates for every call",
                ));
            }
        }
    }

    fn validate_timeouts(config: &Config, result: &mut ValidationResult) {
        if config.client.connect_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "client.connect_timeout_secs",
                "connect_timeout_secs must be greater than 0",
            ));
        }

        if config.client.timeout_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "client.timeout_secs",
                "Request timeout disabled, calls may block indefinitely",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
