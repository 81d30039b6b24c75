// src/filtering/language.rs
//! Best-effort language detection for job descriptions

use whatlang::Lang;

/// Code reported when the text gives no usable signal
pub const FALLBACK_LANGUAGE: &str = "en";

/// Detect the language of `text` as an ISO 639-1 code where one is known.
/// Never fails: empty or undetectable text yields [`FALLBACK_LANGUAGE`].
pub fn detect_language(text: &str) -> String {
    match whatlang::detect(text) {
        Some(info) => iso_code(info.lang()).to_string(),
        None => FALLBACK_LANGUAGE.to_string(),
    }
}

fn iso_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Deu => "de",
        Lang::Fra => "fr",
        Lang::Spa => "es",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "no",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Ces => "cs",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Ell => "el",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        other => other.code(),
    }
}
