use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;

/// Language utilities for language-name equivalence and ISO code handling
///
/// Detected languages come back from the classifier as free-form names
/// ("English (US)", "Español", "zh") while targets are configured by name.
/// Equivalence is decided with a static synonym table matched by whole
/// tokens, backed by ISO 639 lookups for languages the table does not list.

/// One canonical language and every spelling that refers to it
#[derive(Debug)]
pub struct CanonicalLanguage {
    /// Canonical English name, lowercase
    pub name: &'static str,
    /// ISO 639-1 code used for output file names
    pub code: &'static str,
    /// Names, codes and native spellings, lowercase
    pub synonyms: &'static [&'static str],
}

static CANONICAL_LANGUAGES: Lazy<Vec<CanonicalLanguage>> = Lazy::new(|| {
    vec![
        CanonicalLanguage { name: "english", code: "en", synonyms: &["en", "eng", "english", "anglais"] },
        CanonicalLanguage { name: "spanish", code: "es", synonyms: &["es", "esp", "spa", "spanish", "español", "espanol", "castellano"] },
        CanonicalLanguage { name: "french", code: "fr", synonyms: &["fr", "fra", "fre", "french", "français", "francais"] },
        CanonicalLanguage { name: "german", code: "de", synonyms: &["de", "deu", "ger", "german", "deutsch"] },
        CanonicalLanguage { name: "italian", code: "it", synonyms: &["it", "ita", "italian", "italiano"] },
        CanonicalLanguage { name: "portuguese", code: "pt", synonyms: &["pt", "por", "portuguese", "português", "portugues"] },
        CanonicalLanguage { name: "japanese", code: "ja", synonyms: &["ja", "jpn", "japanese", "日本語"] },
        CanonicalLanguage { name: "korean", code: "ko", synonyms: &["ko", "kor", "korean", "한국어"] },
        CanonicalLanguage { name: "chinese", code: "zh", synonyms: &["zh", "chi", "zho", "chinese", "中文", "mandarin"] },
        CanonicalLanguage { name: "russian", code: "ru", synonyms: &["ru", "rus", "russian", "русский"] },
        CanonicalLanguage { name: "arabic", code: "ar", synonyms: &["ar", "ara", "arabic", "العربية"] },
        CanonicalLanguage { name: "dutch", code: "nl", synonyms: &["nl", "nld", "dut", "dutch", "nederlands", "flemish"] },
        CanonicalLanguage { name: "polish", code: "pl", synonyms: &["pl", "pol", "polish", "polski"] },
        CanonicalLanguage { name: "swedish", code: "sv", synonyms: &["sv", "swe", "swedish", "svenska"] },
        CanonicalLanguage { name: "turkish", code: "tr", synonyms: &["tr", "tur", "turkish", "türkçe", "turkce"] },
        CanonicalLanguage { name: "hindi", code: "hi", synonyms: &["hi", "hin", "hindi", "हिन्दी"] },
    ]
});

/// Placeholder name used when the language could not be determined
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Split a language name into lowercase word tokens
fn tokenize(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

/// Every canonical entry that one of the name's tokens belongs to
pub fn canonical_languages(name: &str) -> Vec<&'static CanonicalLanguage> {
    let tokens = tokenize(name);
    CANONICAL_LANGUAGES
        .iter()
        .filter(|lang| tokens.iter().any(|t| lang.synonyms.contains(&t.as_str())))
        .collect()
}

/// Resolve a name that is exactly an ISO code or an English language name
fn iso_language(name: &str) -> Option<Language> {
    let trimmed = name.trim();
    if let Ok(part2t) = normalize_to_part2t(trimmed) {
        return Language::from_639_3(&part2t);
    }

    let mut chars = trimmed.chars();
    let title_case = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
        None => return None,
    };
    Language::from_name(&title_case)
}

/// Decide whether a detected language name denotes the target language
pub fn languages_match(detected: &str, target: &str) -> bool {
    let detected = detected.trim().to_lowercase();
    let target = target.trim().to_lowercase();

    if detected.is_empty() || target.is_empty() || detected == UNKNOWN_LANGUAGE.to_lowercase() {
        return false;
    }

    if detected == target {
        return true;
    }

    // "English (US)" vs "English"
    if detected.contains(&target) || target.contains(&detected) {
        return true;
    }

    let detected_entries = canonical_languages(&detected);
    let target_entries = canonical_languages(&target);
    if detected_entries.iter().any(|d| target_entries.iter().any(|t| std::ptr::eq(*d, *t))) {
        return true;
    }

    if detected_entries.is_empty() || target_entries.is_empty() {
        if let (Some(a), Some(b)) = (iso_language(&detected), iso_language(&target)) {
            return a == b;
        }
    }

    false
}

/// Short language code used in output file names (`movie.es.srt`)
pub fn language_code_for(target: &str) -> String {
    if let Some(lang) = canonical_languages(target).first() {
        return lang.code.to_string();
    }

    if let Some(code) = iso_language(target).and_then(|lang| lang.to_639_1()) {
        return code.to_string();
    }

    target.trim().to_lowercase().chars().take(2).collect()
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's a 2-letter code, convert to 3-letter
    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    }
    // If it's already a 3-letter code, ensure it's ISO 639-2/T
    else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        // ISO 639-2/B codes that differ from their 639-2/T form
        let part2t = match normalized_code.as_str() {
            "fre" => "fra",
            "ger" => "deu",
            "dut" => "nld",
            "gre" => "ell",
            "chi" => "zho",
            "cze" => "ces",
            "ice" => "isl",
            "alb" => "sqi",
            "arm" => "hye",
            "baq" => "eus",
            "bur" => "mya",
            "per" => "fas",
            "geo" => "kat",
            "may" => "msa",
            "mac" => "mkd",
            "rum" => "ron",
            "slo" => "slk",
            "wel" => "cym",
            _ => "",
        };
        if !part2t.is_empty() {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name for a stream language tag
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
