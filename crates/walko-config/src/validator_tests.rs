use super::*;

fn with_token() -> Config {
    let mut config = Config::default();
    config.api.token = Some("tok".to_string());
    config
}

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&with_token()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_missing_token_warning() {
    let result = ConfigValidator::validate(&Config::default()).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "api.token"));
}

#[test]
fn test_validate_invalid_base_url() {
    let mut config = with_token();
    config.api.base_url = "app.walko.io".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "api.base_url"));
}

#[test]
fn test_validate_http_base_url() {
    let mut config = with_token();
    config.api.base_url = "http://localhost:4000".to_string();
    assert!(ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_validate_negative_margin() {
    let mut config = with_token();
    config.render.viewport_margin = -1.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "render.viewport_margin"));
}

#[test]
fn test_validate_zero_card_height() {
    let mut config = with_token();
    config.render.estimated_card_height = 0.0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "render.estimated_card_height"));
}

#[test]
fn test_validate_zero_retry_delay_warning() {
    let mut config = with_token();
    config.render.retry_delay_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "render.retry_delay_ms"));
}

#[test]
fn test_validate_unsupported_locale_warning() {
    let mut config = with_token();
    config.visitor.user_locale = Some("ko-KR".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "visitor.user_locale"));
}

#[test]
fn test_validate_multiple_errors() {
    let mut config = with_token();
    config.api.base_url = String::new();
    config.api.source = String::new();
    config.render.viewport_margin = f64::NAN;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.len() >= 3);
}

#[test]
fn test_into_error() {
    let mut result = ValidationResult::default();
    assert!(ValidationResult::default().into_error().is_none());
    result.add_error(ValidationError::new("api.base_url", "bad"));
    let err = result.into_error().unwrap();
    assert!(err.to_string().contains("api.base_url"));
}

#[test]
fn test_validation_result_add_warning() {
    let mut result = ValidationResult::default();
    result.add_warning(ValidationWarning::new("test", "warning"));
    assert!(result.is_valid());
    assert_eq!(result.warnings.len(), 1);
}
