mod common;

use pretty_assertions::assert_eq;

use common::english_mapping;
use wvs_align::config::{Language, LOOKUP_THRESHOLD};
use wvs_align::matcher::{cosine_similarity, tokenize, FuzzyMatcher, TfidfVectorizer};
use wvs_align::{closest_questions, lookup_question};

const CANDIDATES: [&str; 4] = [
    "How important is family in your life?",
    "How important are friends in your life?",
    "Do you belong to a religious denomination?",
    "Generally speaking, would you say that most people can be trusted?",
];

#[test]
fn test_tokenize() {
    assert_eq!(
        tokenize("How important is Family? I'd say a lot"),
        vec!["how", "important", "is", "family", "say", "lot"]
    );
}

#[test]
fn test_vectorizer_normalizes_rows() {
    let vectorizer = TfidfVectorizer::fit(&CANDIDATES);
    assert!(vectorizer.vocabulary_len() > 10);

    let vector = vectorizer.transform(CANDIDATES[0]);
    assert!((vector.norm() - 1.0).abs() < 1e-9);
    assert!(vectorizer.transform("zebra quantum").is_zero());
}

#[test]
fn test_cosine_similarity_bounds() {
    let vectorizer = TfidfVectorizer::fit(&CANDIDATES);
    let a = vectorizer.transform(CANDIDATES[0]);
    let b = vectorizer.transform(CANDIDATES[2]);
    let empty = vectorizer.transform("");

    assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    assert_eq!(cosine_similarity(&a, &empty), 0.0);
    let score = cosine_similarity(&a, &b);
    assert!((0.0..1.0).contains(&score));
}

#[test]
fn test_identical_text_matches() {
    let matcher = FuzzyMatcher::new(&CANDIDATES);
    assert_eq!(matcher.len(), 4);

    let best = matcher.best_match(CANDIDATES[1], LOOKUP_THRESHOLD).unwrap();
    assert_eq!(best.index, 1);
    assert!((best.score - 1.0).abs() < 1e-9);

    // Case and punctuation do not matter.
    let best = matcher
        .best_match("how IMPORTANT are friends in your life", LOOKUP_THRESHOLD)
        .unwrap();
    assert_eq!(best.index, 1);
}

#[test]
fn test_unrelated_text_does_not_match() {
    let matcher = FuzzyMatcher::new(&CANDIDATES);
    assert_eq!(matcher.best_match("zebra quantum spaghetti", LOOKUP_THRESHOLD), None);
    assert_eq!(matcher.best_match("zebra quantum spaghetti", 0.0).map(|m| m.index), Some(0));
}

#[test]
fn test_ties_resolve_to_first_candidate() {
    let matcher = FuzzyMatcher::new(&["same words here", "same words here", "other"]);
    let best = matcher.best_match("same words here", 0.5).unwrap();
    assert_eq!(best.index, 0);
}

#[test]
fn test_empty_candidates() {
    let matcher = FuzzyMatcher::new::<&str>(&[]);
    assert!(matcher.is_empty());
    assert_eq!(matcher.best_match("anything", 0.0), None);
    assert!(matcher.top_k("anything", 3).is_empty());
}

#[test]
fn test_top_k_orders_by_score() {
    let matcher = FuzzyMatcher::new(&CANDIDATES);
    let top = matcher.top_k("important in your life", 2);
    assert_eq!(top.len(), 2);
    assert!(top[0].score >= top[1].score);
    assert!(top.iter().all(|m| m.index < 2));
}

#[test]
fn test_lookup_question() {
    let mappings: Vec<_> = CANDIDATES
        .iter()
        .enumerate()
        .map(|(i, text)| english_mapping(&format!("Q{}", i + 1), text, &["Yes", "No"]))
        .collect();

    let (row, best) = lookup_question(
        &mappings,
        "Would you say most people can be trusted?",
        Language::English,
        0.5,
    )
    .unwrap();
    assert_eq!(row.english.question_id, "Q4");
    assert!(best.score >= 0.5);

    assert!(lookup_question(&mappings, "zebra", Language::English, LOOKUP_THRESHOLD).is_none());

    let (row, _) = lookup_question(
        &mappings,
        "Do you belong to a religious denomination? (tr)",
        Language::Turkish,
        LOOKUP_THRESHOLD,
    )
    .unwrap();
    assert_eq!(row.turkish.question_id, "Q3");

    let nearest = closest_questions(&mappings, "friends", Language::English, 1);
    assert_eq!(nearest.len(), 1);
    assert_eq!(nearest[0].0.english.question_id, "Q2");
}
