use super::*;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_min_group_size_too_small() {
    let mut config = Config::default();
    config.grouping.min_group_size = 1;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "grouping.min_group_size"));
}

#[test]
fn test_zero_retry_attempts() {
    let mut config = Config::default();
    config.grouping.retry.max_attempts = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "grouping.retry.max_attempts"));
}

#[test]
fn test_zero_pacing_warns() {
    let mut config = Config::default();
    config.grouping.pacing_delay_ms = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "grouping.pacing_delay_ms"));
}

#[test]
fn test_temperature_out_of_range() {
    let mut config = Config::default();
    config.naming.temperature_cap = 3.5;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "naming.temperature_cap"));
}

#[test]
fn test_high_temperature_warns() {
    let mut config = Config::default();
    config.naming.temperature_cap = 0.9;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "naming.temperature_cap"));
}

#[test]
fn test_label_len_bounds() {
    let mut config = Config::default();
    config.naming.max_label_len = 80;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "naming.max_label_len"));
}

#[test]
fn test_unknown_log_level_warns() {
    let mut config = Config::default();
    config.logging.level = "loud".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "logging.level"));
}
