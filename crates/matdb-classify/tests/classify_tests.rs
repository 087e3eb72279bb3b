use matdb_classify::{classify, detect_language};
use matdb_core::types::{Language, QueryType, SearchStrategy};

#[test]
fn standard_code_is_exact_with_high_confidence() {
    let c = classify("RM000001");
    assert!(c.is_raw_materials_query);
    assert_eq!(c.query_type, QueryType::ExactCode);
    assert_eq!(c.search_strategy, SearchStrategy::ExactMatch);
    assert!(c.confidence >= 0.95);
    assert_eq!(c.extracted_entities.codes, vec!["RM000001".to_string()]);
    assert!(c.has_exact_code_intent());
}

#[test]
fn code_inside_a_sentence_is_canonicalized() {
    for query in ["what is rm000001?", "details for RM-000001 please", "รหัสRM000001"] {
        let c = classify(query);
        assert_eq!(c.query_type, QueryType::ExactCode, "{query}");
        assert_eq!(c.extracted_entities.codes, vec!["RM000001".to_string()], "{query}");
    }
}

#[test]
fn several_codes_lower_confidence_and_dedupe() {
    let c = classify("compare RM000001, RM000002 and rm000001");
    assert_eq!(c.query_type, QueryType::ExactCode);
    assert!((c.confidence - 0.90).abs() < 1e-6);
    assert_eq!(c.extracted_entities.codes, vec!["RM000001".to_string(), "RM000002".to_string()]);
}

#[test]
fn loose_families_score_lower() {
    for (query, code) in [("RM12345", "RM12345"), ("MAT1234 stock", "MAT1234"), ("rc-55501", "RC55501")] {
        let c = classify(query);
        assert_eq!(c.query_type, QueryType::ExactCode, "{query}");
        assert!((c.confidence - 0.80).abs() < 1e-6, "{query}");
        assert_eq!(c.extracted_entities.codes, vec![code.to_string()]);
    }
}

#[test]
fn code_embedded_in_a_longer_token_is_ignored() {
    let c = classify("XRM000001Y");
    assert_ne!(c.query_type, QueryType::ExactCode);
}

#[test]
fn english_words_before_numbers_are_not_codes() {
    for query in ["ordered 2 bath mat 2024", "rc 5550 please", "the mat 123456 was cheap"] {
        let c = classify(query);
        assert_ne!(c.query_type, QueryType::ExactCode, "{query}");
        assert!(c.extracted_entities.codes.is_empty(), "{query}");
    }
    assert_eq!(classify("rm 000001").extracted_entities.codes, vec!["RM000001".to_string()]);
    assert_eq!(classify("MAT-2024 stock").extracted_entities.codes, vec!["MAT2024".to_string()]);
}

#[test]
fn explicit_names_ride_along_with_codes() {
    let c = classify(r#"RM000002 or "Hydrasoft HA""#);
    assert_eq!(c.query_type, QueryType::ExactCode);
    assert_eq!(c.extracted_entities.codes, vec!["RM000002".to_string()]);
    assert_eq!(c.extracted_entities.names, vec!["Hydrasoft HA".to_string()]);

    let quoted_code = classify(r#"details for "RM000001""#);
    assert!(quoted_code.extracted_entities.names.is_empty());
    assert!(classify("what is RM000001").extracted_entities.names.is_empty());
}

#[test]
fn generic_chat_is_not_a_domain_query() {
    for query in [
        "hello",
        "how are you",
        "tell me about ingredients",
        "",
        "   ",
        "What is this?",
        "What is AI?",
        "What is ChatGPT",
    ] {
        let c = classify(query);
        assert!(!c.is_raw_materials_query, "{query:?}");
        assert_eq!(c.query_type, QueryType::Generic, "{query:?}");
        assert_eq!(c.confidence, 0.0);
        assert!(c.extracted_entities.is_empty());
    }
}

#[test]
fn quoted_and_interrogative_names() {
    let quoted = classify("do we stock \"Tinogard TT\"?");
    assert_eq!(quoted.query_type, QueryType::NameSearch);
    assert_eq!(quoted.extracted_entities.names, vec!["Tinogard TT".to_string()]);

    let asked = classify("What is Tinogard TT?");
    assert_eq!(asked.query_type, QueryType::NameSearch);
    assert!((asked.confidence - 0.85).abs() < 1e-6);
    assert_eq!(asked.search_strategy, SearchStrategy::FuzzyMatch);
    assert_eq!(asked.extracted_entities.names, vec!["Tinogard TT".to_string()]);

    let code_of = classify("what code does Hydrasoft HA have");
    assert_eq!(code_of.extracted_entities.names, vec!["Hydrasoft HA".to_string()]);
}

#[test]
fn thai_name_question() {
    let c = classify("ไฮยาลูรอนิกมีรหัสอะไรครับ");
    assert_eq!(c.query_type, QueryType::NameSearch);
    assert_eq!(c.extracted_entities.names, vec!["ไฮยาลูรอนิก".to_string()]);
    assert_eq!(c.language, Language::Thai);
}

#[test]
fn property_queries_route_to_semantic_search() {
    let en = classify("moisturizing ingredients for dry skin");
    assert_eq!(en.query_type, QueryType::PropertySearch);
    assert!((en.confidence - 0.80).abs() < 1e-6);
    assert_eq!(en.search_strategy, SearchStrategy::SemanticSearch);
    assert!(en.extracted_entities.properties.contains(&"moisturizing".to_string()));

    let th = classify("สารให้ความชุ่มชื้น");
    assert_eq!(th.query_type, QueryType::PropertySearch);
    assert!(th.extracted_entities.properties.contains(&"moisturizing".to_string()));

    let lower = classify("what is a good preservative");
    assert_eq!(lower.query_type, QueryType::PropertySearch);
}

#[test]
fn supplier_phrasing_is_description_search() {
    let c = classify("ingredients supplied by Bloom Chemicals");
    assert_eq!(c.query_type, QueryType::DescriptionSearch);
    assert_eq!(c.search_strategy, SearchStrategy::SemanticSearch);
    assert_eq!(c.extracted_entities.properties, vec!["bloom chemicals".to_string()]);
}

#[test]
fn language_detection() {
    assert_eq!(detect_language("moisturizing cream"), Language::English);
    assert_eq!(detect_language("สารกันเสีย"), Language::Thai);
    assert_eq!(detect_language("Glycerin คืออะไร"), Language::Mixed);
    assert_eq!(detect_language("12345 ?!"), Language::English);
}

#[test]
fn classification_serializes_in_camel_case() {
    let json = serde_json::to_value(classify("RM000001")).unwrap();
    assert_eq!(json["queryType"], "exact_code");
    assert_eq!(json["searchStrategy"], "exact_match");
    assert_eq!(json["isRawMaterialsQuery"], true);
}
