/*!
 * Tests for configuration loading and validation
 */

use subtrans::app_config::{Config, LogLevel, TranslationProvider};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_saveAndLoad_shouldPreserveSettings() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "German".to_string();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.common.max_chunk_chars = 4000;
    config.extraction.use_mkvextract = false;
    config.log_level = LogLevel::Debug;
    config.save_to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "German");
    assert_eq!(loaded.translation.provider, TranslationProvider::Ollama);
    assert_eq!(loaded.translation.common.max_chunk_chars, 4000);
    assert!(!loaded.extraction.use_mkvextract);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let path = create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    let dir = create_temp_dir().unwrap();
    assert!(Config::from_file(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_validate_shouldRejectUnusableValues() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());

    let mut empty_target = config.clone();
    empty_target.target_language = "  ".to_string();
    assert!(empty_target.validate().is_err());

    let mut zero_chunk = config.clone();
    zero_chunk.translation.common.max_chunk_chars = 0;
    assert!(zero_chunk.validate().is_err());

    let mut zero_timeout = config.clone();
    zero_timeout.extraction.timeout_secs = 0;
    assert!(zero_timeout.validate().is_err());
}

#[test]
fn test_validate_withAnthropicKey_shouldPass() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.translation.active_provider_config_mut().api_key = "sk-ant-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_getModel_withEmptyModel_shouldFallBackToProviderDefault() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().model = String::new();
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");

    config.translation.active_provider_config_mut().model = "gpt-4o".to_string();
    assert_eq!(config.translation.get_model(), "gpt-4o");
}
