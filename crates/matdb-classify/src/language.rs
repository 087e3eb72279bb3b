use matdb_core::types::{is_thai_char, Language};

/// Thai-script share of letters above which a query counts as Thai.
pub const THAI_THRESHOLD: f32 = 0.7;
/// Thai-script share below which a query counts as English.
pub const ENGLISH_THRESHOLD: f32 = 0.3;

/// Classify by the share of Thai-script letters among Thai + Latin letters.
/// Digits, punctuation and whitespace are ignored; no letters means English.
pub fn detect_language(text: &str) -> Language {
    let (mut thai, mut latin) = (0usize, 0usize);
    for c in text.chars() {
        if is_thai_char(c) {
            thai += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        }
    }
    let total = thai + latin;
    if total == 0 {
        return Language::English;
    }
    let ratio = thai as f32 / total as f32;
    if ratio > THAI_THRESHOLD {
        Language::Thai
    } else if ratio < ENGLISH_THRESHOLD {
        Language::English
    } else {
        Language::Mixed
    }
}
