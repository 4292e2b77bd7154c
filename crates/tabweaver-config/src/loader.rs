//! Configuration loader.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.tabweaver`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PartitionStrategyConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.grouping.min_group_size, 2);
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.tabweaver");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_grouping_section() {
        let content = r#"
            debug_mode = true

            [grouping]
            strategy = "main_domain"
            allow_loading_tabs = true
            pacing_delay_ms = 10

            [grouping.retry]
            max_attempts = 3
            delay_ms = 5
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(config.debug_mode);
        assert_eq!(config.grouping.strategy, PartitionStrategyConfig::MainDomain);
        assert!(config.grouping.allow_loading_tabs);
        assert_eq!(config.grouping.pacing_delay_ms, 10);
        assert_eq!(config.grouping.retry.max_attempts, 3);
        assert_eq!(config.grouping.retry.delay_ms, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[naming]").unwrap();
        writeln!(file, "top_k_cap = 20").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.naming.top_k_cap, 20);
        assert!((config.naming.temperature_cap - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/tabweaver.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/tabweaver.toml")).unwrap();
        assert_eq!(config.status.freshness_secs, 30);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("TABWEAVER_TEST_LEVEL", "debug");
        }
        let content = "[logging]\nlevel = \"${TABWEAVER_TEST_LEVEL}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.logging.level, "debug");
        unsafe {
            std::env::remove_var("TABWEAVER_TEST_LEVEL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let content = "value = \"${TABWEAVER_SURELY_UNSET_VAR}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }
}
