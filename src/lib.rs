pub mod align;
pub mod config;
pub mod demographics;
pub mod global;
pub mod literal;
pub mod logging;
pub mod matcher;
pub mod microdata;
pub mod parse;
pub mod persona;
pub mod questions;
pub mod segment;
pub mod table;
pub mod tabulate;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::align::{align_questions, find_inconsistencies, Alignment, Inconsistency, QuestionMapping};
use crate::config::{ExtractorConfig, Language};
use crate::logging::MATCHING;
use crate::matcher::{FuzzyMatcher, Match};
use crate::microdata::Microdata;
use crate::persona::{matching_respondents, parse_description, PersonaFeatures};
use crate::questions::QuestionExtractor;
use crate::tabulate::{response_distribution, ResponseDistribution};

/// Result of running both questionnaires through extraction and alignment.
#[derive(Debug, Clone)]
pub struct QuestionnaireMapping {
    pub alignment: Alignment,
    pub inconsistencies: Vec<Inconsistency>,
}

/// Extract questions from both questionnaire texts and pair them by position
///
/// # Arguments
/// * `turkish_text` - Full text of the Turkish questionnaire
/// * `english_text` - Full text of the English questionnaire
/// * `turkish_config` / `english_config` - Label vocabulary and sentinels per document
///
/// # Returns
/// * `QuestionnaireMapping` - The aligned rows plus the rows flagged for review
pub fn map_questionnaires(
    turkish_text: &str,
    english_text: &str,
    turkish_config: ExtractorConfig,
    english_config: ExtractorConfig,
) -> QuestionnaireMapping {
    let turkish = QuestionExtractor::new(turkish_config).extract_questions(turkish_text);
    let english = QuestionExtractor::new(english_config).extract_questions(english_text);

    let alignment = align_questions(turkish, english);
    let inconsistencies = find_inconsistencies(&alignment.mappings);

    QuestionnaireMapping {
        alignment,
        inconsistencies,
    }
}

fn question_texts(mappings: &[QuestionMapping], language: Language) -> Vec<&str> {
    mappings
        .iter()
        .map(|m| match language {
            Language::Turkish => m.turkish.question_text.as_str(),
            Language::English => m.english.question_text.as_str(),
        })
        .collect()
}

/// Finds the mapping row whose question text in `language` best matches `query`.
pub fn lookup_question<'a>(
    mappings: &'a [QuestionMapping],
    query: &str,
    language: Language,
    threshold: f64,
) -> Option<(&'a QuestionMapping, Match)> {
    let texts = question_texts(mappings, language);
    let best = FuzzyMatcher::new(&texts).best_match(query, threshold)?;
    Some((&mappings[best.index], best))
}

/// The `k` mapping rows closest to `query`, best first, whatever their score.
pub fn closest_questions<'a>(
    mappings: &'a [QuestionMapping],
    query: &str,
    language: Language,
    k: usize,
) -> Vec<(&'a QuestionMapping, Match)> {
    let texts = question_texts(mappings, language);
    FuzzyMatcher::new(&texts)
        .top_k(query, k)
        .into_iter()
        .map(|m| (&mappings[m.index], m))
        .collect()
}

#[derive(Debug, Clone)]
pub struct PersonaResponses<'a> {
    pub mapping: &'a QuestionMapping,
    pub question_match: Match,
    pub features: PersonaFeatures,
    pub distribution: ResponseDistribution,
}

/// How respondents resembling `description` answered the mapped question
/// closest to `question`.
///
/// The microdata column is the Turkish question id. `Ok(None)` means no
/// question reached `threshold`.
pub fn persona_responses<'a>(
    mappings: &'a [QuestionMapping],
    data: &Microdata,
    description: &str,
    question: &str,
    language: Language,
    threshold: f64,
) -> Result<Option<PersonaResponses<'a>>> {
    let Some((mapping, question_match)) = lookup_question(mappings, question, language, threshold)
    else {
        return Ok(None);
    };
    let question_id = &mapping.turkish.question_id;
    info!(
        target: MATCHING,
        question = %question_id,
        score = question_match.score,
        "Matched question"
    );

    let features = parse_description(description);
    let selected = matching_respondents(data, &features)?;
    let distribution = response_distribution(data, question_id, |row| selected[row])
        .ok_or_else(|| anyhow!("Microdata has no column {question_id}"))?;

    Ok(Some(PersonaResponses {
        mapping,
        question_match,
        features,
        distribution,
    }))
}
