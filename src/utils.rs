// src/utils.rs

/// Normalize a configured language name or code to a lowercase ISO 639-1 code
pub fn normalize_language(lang: &str) -> String {
    let lowered = lang.trim().to_lowercase();
    match lowered.as_str() {
        "fr" | "french" | "français" => "fr".to_string(),
        "en" | "english" | "anglais" => "en".to_string(),
        "es" | "spanish" | "español" => "es".to_string(),
        "de" | "german" | "deutsch" => "de".to_string(),
        "it" | "italian" | "italiano" => "it".to_string(),
        "nl" | "dutch" | "nederlands" => "nl".to_string(),
        "pt" | "portuguese" | "português" => "pt".to_string(),
        _ => lowered,
    }
}

/// Lowercase keyword list once so matching does not repeat the work per posting.
/// Surrounding spaces are kept: `" go "` matches a whole word only.
pub fn lowercase_keywords(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|word| word.to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Case-insensitive substring match; `keywords` must already be lowercase
pub fn contains_any_keyword(haystack: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    keywords.iter().any(|word| haystack.contains(word.as_str()))
}
