/*!
 * Tests for language name matching and output codes
 */

use subtrans::language_utils::{get_language_name, language_code_for, languages_match, normalize_to_part2t};

#[test]
fn test_languagesMatch_shouldHonorRequiredResults() {
    assert!(languages_match("English", "en"));
    assert!(!languages_match("French", "English"));
    assert!(languages_match("English (US)", "English"));
    assert!(!languages_match("Unknown", "French"));
}

#[test]
fn test_languagesMatch_shouldIgnoreCaseAndWhitespace() {
    assert!(languages_match("  spanish ", "Spanish"));
    assert!(languages_match("FRENCH", "french"));
}

#[test]
fn test_languagesMatch_withNativeSpellings_shouldMatch() {
    assert!(languages_match("Español", "Spanish"));
    assert!(languages_match("Deutsch", "German"));
    assert!(languages_match("日本語", "Japanese"));
    assert!(languages_match("fre", "French"));
}

#[test]
fn test_languagesMatch_withEmptyInput_shouldNotMatch() {
    assert!(!languages_match("", "English"));
    assert!(!languages_match("English", ""));
}

#[test]
fn test_languagesMatch_withLanguageOutsideTable_shouldUseIsoNames() {
    assert!(languages_match("Finnish", "fi"));
    assert!(languages_match("fin", "Finnish"));
    assert!(!languages_match("Finnish", "Swedish"));
}

#[test]
fn test_languageCodeFor_shouldPreferIsoCodes() {
    assert_eq!(language_code_for("Spanish"), "es");
    assert_eq!(language_code_for("French"), "fr");
    assert_eq!(language_code_for("Finnish"), "fi");
    assert_eq!(language_code_for("Xyzzy"), "xy");
}

#[test]
fn test_normalizeToPart2t_shouldAcceptAllCodeForms() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t(" FRE ").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
    assert!(normalize_to_part2t("xyz1").is_err());
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_language_name("zz").is_err());
}
