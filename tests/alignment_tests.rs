mod common;

use pretty_assertions::assert_eq;

use common::{mapping, record, ENGLISH_SAMPLE, TURKISH_SAMPLE};
use wvs_align::align::{align_questions, find_inconsistencies, inconsistency_reasons, InconsistencyReason};
use wvs_align::config::ExtractorConfig;
use wvs_align::map_questionnaires;
use wvs_align::table::{
    read_mapping_rows, read_mappings, write_inconsistencies, write_mapping_rows, write_mappings,
    MAPPING_COLUMNS,
};

#[test]
fn test_align_equal_lengths() {
    let turkish = vec![record("Q1", "Bir", &[], None), record("Q2", "İki", &[], None)];
    let english = vec![record("Q1", "One", &[], None), record("Q2", "Two", &[], None)];

    let alignment = align_questions(turkish, english);
    assert!(alignment.is_balanced());
    assert_eq!(alignment.mappings.len(), 2);
    assert_eq!(alignment.mappings[1].turkish.question_text, "İki");
    assert_eq!(alignment.mappings[1].english.question_text, "Two");
}

#[test]
fn test_align_keeps_surplus() {
    let turkish = vec![record("Q1", "Bir", &[], None)];
    let english = vec![
        record("Q1", "One", &[], None),
        record("Q2", "Two", &[], None),
        record("Q3", "Three", &[], None),
    ];

    let alignment = align_questions(turkish, english);
    assert!(!alignment.is_balanced());
    assert_eq!(alignment.mappings.len(), 1);
    assert!(alignment.surplus_turkish.is_empty());
    let surplus: Vec<&str> = alignment
        .surplus_english
        .iter()
        .map(|q| q.question_id.as_str())
        .collect();
    assert_eq!(surplus, vec!["Q2", "Q3"]);
}

#[test]
fn test_align_empty_side() {
    let alignment = align_questions(vec![], vec![record("Q1", "One", &[], None)]);
    assert!(alignment.mappings.is_empty());
    assert_eq!(alignment.surplus_english.len(), 1);
}

#[test]
fn test_inconsistency_reasons() {
    let consistent = mapping(
        record("Q1", "a", &["Evet", "Hayır"], Some("card")),
        record("Q1", "a", &["Yes", "No"], Some("card")),
    );
    assert!(inconsistency_reasons(&consistent).is_empty());

    let both = mapping(
        record("Q2", "b", &["Evet"], Some("card")),
        record("Q2", "b", &["Yes", "No"], None),
    );
    assert_eq!(
        inconsistency_reasons(&both),
        vec![
            InconsistencyReason::OptionCountMismatch,
            InconsistencyReason::ShowCardMismatch
        ]
    );

    // Each mapping is listed once however many rules it breaks.
    let flagged = find_inconsistencies(&[consistent, both.clone()]);
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].mapping, both);
    assert_eq!(flagged[0].reasons.len(), 2);
}

#[test]
fn test_map_questionnaires() {
    let result = map_questionnaires(
        TURKISH_SAMPLE,
        ENGLISH_SAMPLE,
        ExtractorConfig::default().with_sentinels("Fikri Yok", "Cevap Yok"),
        ExtractorConfig::default(),
    );

    let alignment = &result.alignment;
    assert_eq!(alignment.mappings.len(), 2);
    assert_eq!(alignment.surplus_turkish.len(), 1);
    assert_eq!(alignment.surplus_turkish[0].question_id, "Q3");

    let first = &alignment.mappings[0];
    assert_eq!(first.turkish.question_text, "Çalışmak topluma karşı bir görevdir.");
    assert_eq!(
        first.turkish.response_options,
        vec!["Kesinlikle Katılırım", "Katılırım", "Katılmam", "Kesinlikle Katılmam"]
    );
    assert_eq!(first.english.question_text, "Work is a duty towards society.");

    let second = &alignment.mappings[1];
    assert_eq!(second.turkish.response_options[4], "Fikri Yok");
    assert_eq!(second.turkish.response_options[5], "Cevap Yok");
    assert_eq!(second.english.response_options[4], "no opinion");

    // Q2 has six Turkish options and five English ones.
    assert_eq!(result.inconsistencies.len(), 1);
    assert_eq!(result.inconsistencies[0].mapping.english.question_id, "Q2");
    assert_eq!(
        result.inconsistencies[0].reasons,
        vec![InconsistencyReason::OptionCountMismatch]
    );
}

#[test]
fn test_mapping_csv_header_and_cells() {
    let rows = vec![mapping(
        record("Q1", "Aile ne kadar önemli?", &["Çok önemli", "Don't know"], None),
        record(
            "Q1",
            "How important is family?",
            &["Very important", "Don't know"],
            Some("SHOW CARD A\nVery important"),
        ),
    )];

    let mut buffer = Vec::new();
    let count = write_mapping_rows(&mut buffer, &rows).unwrap();
    assert_eq!(count, 1);

    let text = String::from_utf8(buffer.clone()).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, MAPPING_COLUMNS.join(","));
    assert!(text.contains(r#"['Very important', ""Don't know""]"#));

    let parsed = read_mapping_rows(buffer.as_slice()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].turkish_response_options, "['Çok önemli', \"Don't know\"]");
    assert_eq!(parsed[0].turkish_show_card, None);
    assert_eq!(
        parsed[0].english_show_card.as_deref(),
        Some("SHOW CARD A\nVery important")
    );
}

#[test]
fn test_empty_table_keeps_header() {
    let mut buffer = Vec::new();
    assert_eq!(write_mapping_rows(&mut buffer, std::iter::empty()).unwrap(), 0);
    assert_eq!(String::from_utf8(buffer).unwrap().trim_end(), MAPPING_COLUMNS.join(","));
}

#[test]
fn test_mapping_file_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results").join("survey_question_mapping.csv");

    let result = map_questionnaires(
        TURKISH_SAMPLE,
        ENGLISH_SAMPLE,
        ExtractorConfig::default(),
        ExtractorConfig::default(),
    );
    write_mappings(&path, &result.alignment.mappings).unwrap();

    let reloaded = read_mappings(&path).unwrap();
    assert_eq!(reloaded, result.alignment.mappings);

    let review = dir.path().join("inconsistencies_review.csv");
    write_inconsistencies(&review, &result.inconsistencies).unwrap();
    let flagged = read_mappings(&review).unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].english.question_id, "Q2");
}

#[test]
fn test_option_cells_read_leniently() {
    let csv = format!(
        "{}\nQ1,Soru,\"[, ]\",,Q1,Question,\"['Yes',\n No\",\n",
        MAPPING_COLUMNS.join(",")
    );
    let rows = read_mapping_rows(csv.as_bytes()).unwrap();
    let mapping = wvs_align::align::QuestionMapping::from(rows[0].clone());

    assert!(mapping.turkish.response_options.is_empty());
    assert_eq!(mapping.english.response_options, vec!["Yes", "No"]);
    assert_eq!(mapping.turkish.show_card, None);
}
