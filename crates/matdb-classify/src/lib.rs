//! matdb-classify
//!
//! Turns a raw query into a [`QueryClassification`]. Detection runs in
//! priority order (codes, names, properties) over the tables in [`rules`];
//! anything unrecognized falls back to a zero-confidence `generic` result.
//! Classification is pure and never fails.

pub mod language;
pub mod rules;

use regex::Regex;
use std::sync::LazyLock;

use matdb_core::fuzzy::fuzzy_match_score;
use matdb_core::types::{ExtractedEntities, Language, QueryClassification, QueryType, SearchStrategy};

pub use language::detect_language;
use rules::{
    CodeFamily, SpanRule, CODE_CANDIDATE, CODE_FAMILIES, DESCRIPTION_TERM_WORDS, GENERIC_SUBJECTS,
    GENERIC_SUBJECT_THRESHOLD, INTERROGATIVES, KEYWORD_RULES, MULTI_CODE_CONFIDENCE, NAME_CONFIDENCE,
    PROPERTY_CONFIDENCE, QUOTED_SPANS, TRADE_NAME_MARKERS,
};

const POLITE_PARTICLES: &[&str] = &["ครับ", "ค่ะ", "คะ", "นะ", "จ้า"];

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern, error = %e, "invalid classifier pattern");
            None
        }
    }
}

static CANDIDATE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(CODE_CANDIDATE));

static FAMILIES: LazyLock<Vec<(&'static CodeFamily, Regex)>> =
    LazyLock::new(|| CODE_FAMILIES.iter().filter_map(|f| compile(f.pattern).map(|re| (f, re))).collect());

static QUOTED: LazyLock<Vec<Regex>> = LazyLock::new(|| QUOTED_SPANS.iter().filter_map(|p| compile(p)).collect());

static MARKERS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| TRADE_NAME_MARKERS.iter().filter_map(|p| compile(p)).collect());

static QUESTIONS: LazyLock<Vec<(SpanRule, Regex)>> =
    LazyLock::new(|| INTERROGATIVES.iter().filter_map(|q| compile(q.pattern).map(|re| (q.span, re))).collect());

/// Classify a free-form query.
pub fn classify(query: &str) -> QueryClassification {
    let language = detect_language(query);
    let query = query.trim();
    if query.is_empty() {
        return generic(language);
    }

    let codes = detect_codes(query);
    if let Some((_, single_confidence)) = codes.first() {
        let confidence = if codes.len() > 1 { MULTI_CODE_CONFIDENCE } else { *single_confidence };
        // Only explicitly marked names ride along with codes; interrogative
        // spans would just capture the code again.
        let names = explicit_names(query).into_iter().filter(|n| detect_codes(n).is_empty()).collect();
        let entities =
            ExtractedEntities { codes: codes.into_iter().map(|(c, _)| c).collect(), names, ..Default::default() };
        return domain(QueryType::ExactCode, confidence, SearchStrategy::ExactMatch, entities, language);
    }

    let names = detect_names(query);
    if !names.is_empty() {
        let entities = ExtractedEntities { names, ..Default::default() };
        return domain(QueryType::NameSearch, NAME_CONFIDENCE, SearchStrategy::FuzzyMatch, entities, language);
    }

    if let Some((query_type, properties)) = detect_properties(query) {
        let entities = ExtractedEntities { properties, ..Default::default() };
        return domain(query_type, PROPERTY_CONFIDENCE, SearchStrategy::SemanticSearch, entities, language);
    }

    generic(language)
}

fn domain(
    query_type: QueryType,
    confidence: f32,
    search_strategy: SearchStrategy,
    extracted_entities: ExtractedEntities,
    language: Language,
) -> QueryClassification {
    QueryClassification {
        is_raw_materials_query: true,
        query_type,
        confidence,
        search_strategy,
        extracted_entities,
        language,
    }
}

fn generic(language: Language) -> QueryClassification {
    QueryClassification {
        is_raw_materials_query: false,
        query_type: QueryType::Generic,
        confidence: 0.0,
        search_strategy: SearchStrategy::Hybrid,
        extracted_entities: ExtractedEntities::default(),
        language,
    }
}

/// Canonical codes in order of appearance, with their family confidence.
fn detect_codes(query: &str) -> Vec<(String, f32)> {
    let Some(candidate) = CANDIDATE.as_ref() else { return vec![] };
    let mut found: Vec<(String, f32)> = Vec::new();
    for caps in candidate.captures_iter(query) {
        let (Some(whole), Some(prefix), Some(separator), Some(digits)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        if !at_token_boundary(query, whole.start(), whole.end()) {
            continue;
        }
        let canonical = format!("{}{}", prefix.as_str().to_ascii_uppercase(), digits.as_str());
        if found.iter().any(|(c, _)| *c == canonical) {
            continue;
        }
        let Some((family, _)) = FAMILIES.iter().find(|(_, re)| re.is_match(&canonical)) else { continue };
        if separator.as_str() == " " && !family.space_separated {
            tracing::debug!(family = family.name, candidate = whole.as_str(), "space-separated code rejected");
            continue;
        }
        found.push((canonical, family.confidence));
    }
    found
}

fn at_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric()) && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}

fn detect_names(query: &str) -> Vec<String> {
    let mut names = explicit_names(query);
    if !names.is_empty() {
        return names;
    }

    let stripped = strip_question(query);
    for (span_rule, re) in QUESTIONS.iter() {
        let Some(span) = re.captures(stripped).and_then(|c| c.get(1)) else { continue };
        let candidate = match span_rule {
            SpanRule::Capitalized => leading_capitalized(span.as_str()),
            SpanRule::Verbatim => span.as_str().to_string(),
        };
        if push_name(&mut names, &candidate) {
            break;
        }
    }
    names
}

/// Quoted spans, or failing those the text after a trade-name marker.
fn explicit_names(query: &str) -> Vec<String> {
    let mut names = Vec::new();
    for re in QUOTED.iter() {
        for caps in re.captures_iter(query) {
            if let Some(m) = caps.get(1) {
                push_name(&mut names, m.as_str());
            }
        }
    }
    if !names.is_empty() {
        return names;
    }

    let stripped = strip_question(query);
    for re in MARKERS.iter() {
        if let Some(m) = re.captures(stripped).and_then(|c| c.get(1)) {
            push_name(&mut names, m.as_str());
        }
    }
    names
}

fn push_name(names: &mut Vec<String>, candidate: &str) -> bool {
    let name = candidate.trim().trim_matches(|c: char| c.is_ascii_punctuation() && c != '-').trim();
    if name.chars().count() < 2 || is_generic_subject(name) || names.iter().any(|n| n == name) {
        return false;
    }
    names.push(name.to_string());
    true
}

fn is_generic_subject(name: &str) -> bool {
    GENERIC_SUBJECTS.iter().any(|g| fuzzy_match_score(name, g) >= GENERIC_SUBJECT_THRESHOLD)
}

/// Leading run of words starting with an uppercase letter or a digit.
fn leading_capitalized(span: &str) -> String {
    span.split_whitespace()
        .take_while(|w| w.chars().next().is_some_and(|c| c.is_uppercase() || c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_question(query: &str) -> &str {
    let mut s = query.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '?' | '？' | '.' | '!'));
    loop {
        let before = s;
        for particle in POLITE_PARTICLES {
            s = s.strip_suffix(particle).unwrap_or(s).trim_end();
        }
        if s == before {
            return s;
        }
    }
}

fn detect_properties(query: &str) -> Option<(QueryType, Vec<String>)> {
    let lower = query.to_lowercase();
    let mut properties: Vec<String> = Vec::new();
    let mut query_type = None;
    for rule in KEYWORD_RULES {
        let Some(pos) = find_keyword(&lower, rule.keyword) else { continue };
        let term = match rule.query_type {
            QueryType::DescriptionSearch => {
                let trailing = trailing_term(&lower[pos + rule.keyword.len()..]);
                if trailing.is_empty() { rule.label.to_string() } else { trailing }
            }
            _ => rule.label.to_string(),
        };
        if !properties.contains(&term) {
            properties.push(term);
        }
        query_type = match (query_type, rule.query_type) {
            (Some(QueryType::PropertySearch), _) => Some(QueryType::PropertySearch),
            (_, found) => Some(found),
        };
    }
    query_type.map(|t| (t, properties))
}

/// Byte offset of `keyword` in `haystack`. ASCII keywords must sit on word
/// boundaries; Thai keywords match anywhere since Thai is written unspaced.
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    if !keyword.is_ascii() {
        return haystack.find(keyword);
    }
    haystack
        .match_indices(keyword)
        .map(|(pos, _)| pos)
        .find(|&pos| at_token_boundary(haystack, pos, pos + keyword.len()))
}

fn trailing_term(rest: &str) -> String {
    rest.split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|w| !w.is_empty())
        .take(DESCRIPTION_TERM_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}
