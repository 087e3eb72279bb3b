//! Rule tables driving the classifier. Adding a code family, an interrogative
//! form or a keyword means adding a row here; the control flow in `lib.rs`
//! does not change.

use matdb_core::types::QueryType;

/// An identifier family, matched against the canonical form
/// (uppercase prefix immediately followed by digits).
pub struct CodeFamily {
    pub name: &'static str,
    pub pattern: &'static str,
    pub confidence: f32,
    /// Whether a space may separate prefix and digits. Families whose prefix
    /// is also an English word ("mat 2024") must be written joined or hyphenated.
    pub space_separated: bool,
}

pub static CODE_FAMILIES: &[CodeFamily] = &[
    CodeFamily { name: "standard", pattern: r"^RM\d{6}$", confidence: 0.95, space_separated: true },
    CodeFamily { name: "rm_variant", pattern: r"^RM(?:\d{3,5}|\d{7,8})$", confidence: 0.80, space_separated: true },
    CodeFamily {
        name: "legacy_supplier",
        pattern: r"^(?:RC|RMC|MAT)\d{4,8}$",
        confidence: 0.80,
        space_separated: false,
    },
];

/// Confidence when two or more distinct codes appear in one query.
pub const MULTI_CODE_CONFIDENCE: f32 = 0.90;
pub const NAME_CONFIDENCE: f32 = 0.85;
pub const PROPERTY_CONFIDENCE: f32 = 0.80;

/// Loose scan for prefix+digits tokens. The separator is captured so each
/// family can decide whether a space is acceptable; it is dropped from the
/// canonical form.
pub const CODE_CANDIDATE: &str = r"(?i)([a-z]{2,4})([-_ ]?)(\d{3,8})";

pub const QUOTED_SPANS: &[&str] = &[r#""([^"]{2,80})""#, r"“([^”]{2,80})”", r"(?:^|\s)'([^']{2,80})'"];

pub const TRADE_NAME_MARKERS: &[&str] = &[
    r"(?i)trade\s*name\s*(?:is|:|-)?\s*(.+)$",
    r"ชื่อการค้า\s*(?:คือ|:)?\s*(.+)$",
];

/// How the captured span of an interrogative pattern must look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRule {
    /// Keep the leading run of capitalized words.
    Capitalized,
    /// Take the span as written (Thai has no letter case).
    Verbatim,
}

pub struct Interrogative {
    pub pattern: &'static str,
    pub span: SpanRule,
}

pub static INTERROGATIVES: &[Interrogative] = &[
    Interrogative { pattern: r"(?i)^what\s+code\s+does\s+(.+?)\s+have$", span: SpanRule::Capitalized },
    Interrogative { pattern: r"(?i)^what\s+is\s+the\s+code\s+(?:of|for)\s+(.+)$", span: SpanRule::Capitalized },
    Interrogative { pattern: r"(?i)^(?:what\s+is|what's|whats)\s+(.+)$", span: SpanRule::Capitalized },
    Interrogative { pattern: r"(?i)^code\s+(?:of|for)\s+(.+)$", span: SpanRule::Capitalized },
    Interrogative { pattern: r"(?i)^do\s+you\s+have\s+(.+)$", span: SpanRule::Capitalized },
    Interrogative { pattern: r"^(.+?)\s*มีรหัสอะไร$", span: SpanRule::Verbatim },
    Interrogative { pattern: r"^(.+?)\s*รหัสอะไร$", span: SpanRule::Verbatim },
    Interrogative { pattern: r"^(.+?)\s*คืออะไร$", span: SpanRule::Verbatim },
    Interrogative { pattern: r"^รหัสของ\s*(.+)$", span: SpanRule::Verbatim },
];

/// Subjects of interrogatives that never name a material.
pub const GENERIC_SUBJECTS: &[&str] = &[
    "this", "that", "it", "you", "your name", "the weather", "the time",
    "นี่", "นั่น", "อันนี้", "มัน", "คุณ",
    // off-domain proper nouns that show up in chat
    "ai", "artificial intelligence", "chatgpt", "gpt", "openai", "google", "bitcoin", "python", "love", "life",
    "the meaning of life", "เอไอ", "ปัญญาประดิษฐ์",
];
pub const GENERIC_SUBJECT_THRESHOLD: f32 = 0.92;

pub struct KeywordRule {
    pub keyword: &'static str,
    pub label: &'static str,
    pub query_type: QueryType,
}

const fn prop(keyword: &'static str, label: &'static str) -> KeywordRule {
    KeywordRule { keyword, label, query_type: QueryType::PropertySearch }
}

const fn desc(keyword: &'static str, label: &'static str) -> KeywordRule {
    KeywordRule { keyword, label, query_type: QueryType::DescriptionSearch }
}

pub static KEYWORD_RULES: &[KeywordRule] = &[
    // benefits and functions
    prop("moisturizing", "moisturizing"),
    prop("moisturising", "moisturizing"),
    prop("moisturizer", "moisturizing"),
    prop("hydrating", "moisturizing"),
    prop("hydration", "moisturizing"),
    prop("humectant", "humectant"),
    prop("emollient", "emollient"),
    prop("anti-aging", "anti-aging"),
    prop("anti aging", "anti-aging"),
    prop("antiaging", "anti-aging"),
    prop("wrinkle", "anti-aging"),
    prop("antioxidant", "antioxidant"),
    prop("whitening", "brightening"),
    prop("brightening", "brightening"),
    prop("lightening", "brightening"),
    prop("preservative", "preservative"),
    prop("emulsifier", "emulsifier"),
    prop("emulsifying", "emulsifier"),
    prop("thickener", "thickener"),
    prop("thickening", "thickener"),
    prop("surfactant", "surfactant"),
    prop("cleansing", "surfactant"),
    prop("fragrance", "fragrance"),
    prop("uv filter", "uv filter"),
    prop("sunscreen", "uv filter"),
    prop("spf", "uv filter"),
    prop("antibacterial", "antimicrobial"),
    prop("antimicrobial", "antimicrobial"),
    prop("anti-acne", "anti-acne"),
    prop("acne", "anti-acne"),
    prop("soothing", "soothing"),
    prop("anti-inflammatory", "soothing"),
    prop("exfoliating", "exfoliant"),
    prop("exfoliant", "exfoliant"),
    prop("conditioning", "conditioning"),
    prop("colorant", "colorant"),
    prop("pigment", "colorant"),
    // categories
    prop("extract", "extract"),
    prop("botanical", "extract"),
    prop("peptide", "peptide"),
    prop("vitamin", "vitamin"),
    prop("silicone", "silicone"),
    prop("essential oil", "essential oil"),
    // Thai benefits, functions and categories
    prop("ให้ความชุ่มชื้น", "moisturizing"),
    prop("ชุ่มชื้น", "moisturizing"),
    prop("ลดริ้วรอย", "anti-aging"),
    prop("ริ้วรอย", "anti-aging"),
    prop("ต้านอนุมูลอิสระ", "antioxidant"),
    prop("ไวท์เทนนิ่ง", "brightening"),
    prop("ผิวขาว", "brightening"),
    prop("กระจ่างใส", "brightening"),
    prop("สารกันเสีย", "preservative"),
    prop("อิมัลซิไฟเออร์", "emulsifier"),
    prop("เพิ่มความข้น", "thickener"),
    prop("กันแดด", "uv filter"),
    prop("ลดสิว", "anti-acne"),
    prop("ลดการอักเสบ", "soothing"),
    prop("สารสกัด", "extract"),
    prop("วิตามิน", "vitamin"),
    prop("เปปไทด์", "peptide"),
    // supplier and usage phrasing; the words after the keyword become the term
    desc("supplied by", "supplier"),
    desc("supplier", "supplier"),
    desc("manufacturer", "supplier"),
    desc("suitable for", "usage"),
    desc("recommended for", "usage"),
    desc("used for", "usage"),
    desc("used in", "usage"),
    desc("ผู้จำหน่าย", "supplier"),
    desc("ซัพพลายเออร์", "supplier"),
    desc("ผู้ผลิต", "supplier"),
    desc("เหมาะสำหรับ", "usage"),
    desc("ใช้สำหรับ", "usage"),
];

/// Words kept after a description keyword.
pub const DESCRIPTION_TERM_WORDS: usize = 4;
