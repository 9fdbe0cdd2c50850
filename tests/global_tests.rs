mod common;

use pretty_assertions::assert_eq;

use common::english_mapping;
use wvs_align::config::CROSS_DATASET_THRESHOLD;
use wvs_align::global::{country_choice, match_global_opinions, read_global_opinions, write_global_matches, GlobalOpinion};

const GLOBAL_CSV: &str = r#"question,selections,options,source
How important is family in your life?,"defaultdict(<class 'list'>, {'Turkey': [0.7, 0.2, 0.1], 'Chile': [0.1, 0.8, 0.1]})","['Very important', 'Rather important', 'Not important']",WVS
Is football better than chess?,"{'Chile': [0.5, 0.5]}","['Yes', 'No']",GAS
,"{}","[]",GAS
"#;

fn opinion(selections: &str, options: &str) -> GlobalOpinion {
    GlobalOpinion {
        question: "Q".to_string(),
        selections: selections.to_string(),
        options: options.to_string(),
    }
}

#[test]
fn test_read_global_opinions_skips_blank_questions() {
    let opinions = read_global_opinions(GLOBAL_CSV.as_bytes()).unwrap();
    assert_eq!(opinions.len(), 2);
    assert_eq!(opinions[0].question, "How important is family in your life?");
    assert!(opinions[0].selections.starts_with("defaultdict("));
}

#[test]
fn test_country_choice() {
    let opinions = read_global_opinions(GLOBAL_CSV.as_bytes()).unwrap();

    let (shares, response) = country_choice(&opinions[0], "Turkey").unwrap().unwrap();
    assert_eq!(shares, vec![0.7, 0.2, 0.1]);
    assert_eq!(response, "Very important");

    let (_, response) = country_choice(&opinions[0], "Chile").unwrap().unwrap();
    assert_eq!(response, "Rather important");

    assert_eq!(country_choice(&opinions[1], "Turkey").unwrap(), None);
}

#[test]
fn test_country_choice_ties_and_errors() {
    let tied = opinion("{'Turkey': [0.4, 0.4, 0.2]}", "['A', 'B', 'C']");
    assert_eq!(country_choice(&tied, "Turkey").unwrap().unwrap().1, "A");

    let short = opinion("{'Turkey': [0.1, 0.9]}", "['A']");
    assert!(country_choice(&short, "Turkey").is_err());

    let garbage = opinion("not a dict", "['A']");
    assert!(country_choice(&garbage, "Turkey").is_err());

    let empty = opinion("{'Turkey': []}", "[]");
    assert_eq!(country_choice(&empty, "Turkey").unwrap(), None);
}

#[test]
fn test_match_global_opinions() {
    let opinions = read_global_opinions(GLOBAL_CSV.as_bytes()).unwrap();
    let mappings = vec![
        english_mapping(
            "Q1",
            "How important is family in your life?",
            &["Very important", "Rather important", "Not very important", "Not at all important"],
        ),
        english_mapping("Q2", "Taxes should be lower for small firms.", &["Agree", "Disagree"]),
        english_mapping("Q3", "Is football better than chess?", &["Yes", "No"]),
        english_mapping("Q4", "", &[]),
    ];

    let matches = match_global_opinions(&mappings, &opinions, "Turkey", CROSS_DATASET_THRESHOLD);

    // Q3 matches but has no Turkey data; Q2 matches nothing.
    assert_eq!(matches.len(), 1);
    let found = &matches[0];
    assert_eq!(found.survey_question_id, "Q1");
    assert!((found.similarity - 1.0).abs() < 1e-9);
    assert_eq!(found.survey_options.len(), 4);
    assert_eq!(
        found.global_options,
        vec!["Very important", "Rather important", "Not important"]
    );
    assert_eq!(found.country_selection, vec![0.7, 0.2, 0.1]);
    assert_eq!(found.selected_response, "Very important");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matched_survey_global_data.csv");
    write_global_matches(&path, &matches).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Survey Question ID,Survey Question English Text,Global Data Question Text,Similarity Score,\
         Survey Options,Global Data Options,Turkey Selection Data,Selected Response"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Q1,How important is family in your life?,"));
    assert!(row.contains("\"[0.7, 0.2, 0.1]\""));
    assert!(row.ends_with(",Very important"));
}
