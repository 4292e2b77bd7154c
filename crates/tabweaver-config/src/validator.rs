//! Configuration validation.

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

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_grouping(config, &mut result);
        Self::validate_naming(config, &mut result);
        Self::validate_status(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_grouping(config: &Config, result: &mut ValidationResult) {
        let grouping = &config.grouping;

        if grouping.min_group_size < 2 {
            result.add_error(ValidationError::new(
                "grouping.min_group_size",
                "min_group_size must be at least 2",
            ));
        }

        if grouping.retry.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "grouping.retry.max_attempts",
                "max_attempts must be greater than 0",
            ));
        }

        if grouping.max_title_len == 0 {
            result.add_error(ValidationError::new(
                "grouping.max_title_len",
                "max_title_len must be greater than 0",
            ));
        }

        if grouping.pacing_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "grouping.pacing_delay_ms",
                "No pacing between group creations; rapid mutations may race in the browser",
            ));
        }

        if grouping.settle_delay_ms > 5_000 {
            result.add_warning(ValidationWarning::new(
                "grouping.settle_delay_ms",
                "settle_delay_ms is very high (>5s)",
            ));
        }
    }

    fn validate_naming(config: &Config, result: &mut ValidationResult) {
        let naming = &config.naming;

        if !(0.0..=2.0).contains(&naming.temperature_cap) {
            result.add_error(ValidationError::new(
                "naming.temperature_cap",
                "temperature_cap must be between 0.0 and 2.0",
            ));
        } else if naming.temperature_cap > 0.5 {
            result.add_warning(ValidationWarning::new(
                "naming.temperature_cap",
                "temperature_cap above 0.5 makes the DOMAIN|LABEL format less reliable",
            ));
        }

        if naming.top_k_cap == 0 {
            result.add_error(ValidationError::new(
                "naming.top_k_cap",
                "top_k_cap must be greater than 0",
            ));
        }

        if naming.max_label_len < 2 || naming.max_label_len > 50 {
            result.add_error(ValidationError::new(
                "naming.max_label_len",
                "max_label_len must be between 2 and 50",
            ));
        }
    }

    fn validate_status(config: &Config, result: &mut ValidationResult) {
        let status = &config.status;

        if status.freshness_secs == 0 {
            result.add_error(ValidationError::new(
                "status.freshness_secs",
                "freshness_secs must be greater than 0",
            ));
        }

        if status.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "status.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }

        if status.ui_timeout_secs > 600 {
            result.add_warning(ValidationWarning::new(
                "status.ui_timeout_secs",
                "ui_timeout_secs is very high (>10 minutes)",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "Unknown log level '{}', expected one of {}",
                    config.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
