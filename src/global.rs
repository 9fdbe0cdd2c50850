use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ordered_float::OrderedFloat;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::align::QuestionMapping;
use crate::literal::{format_list, parse_list, parse_literal, strip_defaultdict, Literal};
use crate::logging::MATCHING;
use crate::matcher::{FuzzyMatcher, TfidfVectorizer};
use crate::table::csv_output;

/// A question from the cross-national "global opinions" dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlobalOpinion {
    pub question: String,
    /// Per-country answer shares, possibly wrapped in `defaultdict(...)`.
    #[serde(default)]
    pub selections: String,
    #[serde(default)]
    pub options: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalOpinionMatch {
    pub survey_question_id: String,
    pub survey_question_text: String,
    pub global_question_text: String,
    pub similarity: f64,
    pub survey_options: Vec<String>,
    pub global_options: Vec<String>,
    pub country_selection: Vec<f64>,
    pub selected_response: String,
}

pub fn read_global_opinions<R: Read>(reader: R) -> Result<Vec<GlobalOpinion>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut opinions = Vec::new();

    for (index, record) in csv_reader.deserialize::<GlobalOpinion>().enumerate() {
        match record {
            Ok(opinion) if !opinion.question.trim().is_empty() => opinions.push(opinion),
            Ok(_) => debug!(target: MATCHING, "Skipping global row {index}: empty question"),
            Err(e) => warn!(target: MATCHING, "Skipping global row {index}: {e}"),
        }
    }

    Ok(opinions)
}

pub fn load_global_opinions(path: &Path) -> Result<Vec<GlobalOpinion>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let opinions = read_global_opinions(file)?;
    info!(target: MATCHING, rows = opinions.len(), "Loaded {}", path.display());
    Ok(opinions)
}

/// The country's selection shares and the option it chose most often.
/// Ties resolve to the earliest option.
pub fn country_choice(opinion: &GlobalOpinion, country: &str) -> Result<Option<(Vec<f64>, String)>> {
    let selections = parse_literal(&strip_defaultdict(&opinion.selections))?;
    let options = parse_list(&opinion.options)?;

    let Some(shares) = selections.get(country) else {
        return Ok(None);
    };
    let shares: Vec<f64> = shares
        .as_list()
        .ok_or_else(|| anyhow!("Selections for {country} are not a list"))?
        .iter()
        .map(|v| v.as_f64().ok_or_else(|| anyhow!("Non-numeric share {v}")))
        .collect::<Result<_>>()?;

    let best = shares
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, share)| match best {
            Some((_, top)) if OrderedFloat(top) >= OrderedFloat(*share) => best,
            _ => Some((idx, *share)),
        });

    let Some((best_idx, _)) = best else {
        return Ok(None);
    };
    let response = options
        .get(best_idx)
        .cloned()
        .ok_or_else(|| anyhow!("No option at index {best_idx}"))?;

    Ok(Some((shares, response)))
}

/// Joins survey questions to their closest global-opinions question.
///
/// The vocabulary is fitted over both datasets together. Survey rows without
/// English text are ignored; global rows whose literals cannot be read are
/// logged and skipped.
pub fn match_global_opinions(
    mappings: &[QuestionMapping],
    opinions: &[GlobalOpinion],
    country: &str,
    threshold: f64,
) -> Vec<GlobalOpinionMatch> {
    let survey: Vec<&QuestionMapping> = mappings
        .iter()
        .filter(|m| !m.english.question_text.trim().is_empty())
        .collect();

    let survey_texts: Vec<&str> = survey
        .iter()
        .map(|m| m.english.question_text.as_str())
        .collect();
    let global_texts: Vec<&str> = opinions.iter().map(|o| o.question.as_str()).collect();

    let corpus: Vec<&str> = survey_texts.iter().chain(&global_texts).copied().collect();
    let matcher = FuzzyMatcher::with_vectorizer(TfidfVectorizer::fit(&corpus), &global_texts);

    let mut results = Vec::new();
    for mapping in survey {
        let english = &mapping.english;
        let Some(best) = matcher.best_match(&english.question_text, threshold) else {
            continue;
        };
        let opinion = &opinions[best.index];

        match country_choice(opinion, country) {
            Ok(Some((country_selection, selected_response))) => {
                let global_options = parse_list(&opinion.options).unwrap_or_default();
                results.push(GlobalOpinionMatch {
                    survey_question_id: english.question_id.clone(),
                    survey_question_text: english.question_text.clone(),
                    global_question_text: opinion.question.clone(),
                    similarity: best.score,
                    survey_options: english.response_options.clone(),
                    global_options,
                    country_selection,
                    selected_response,
                });
            }
            Ok(None) => debug!(
                target: MATCHING,
                question = %english.question_id,
                "Matched global question has no {country} data"
            ),
            Err(e) => warn!(
                target: MATCHING,
                question = %english.question_id,
                "Error parsing selections or options: {e:#}"
            ),
        }
    }

    info!(target: MATCHING, matches = results.len(), "Matched survey to global data");
    results
}

pub fn write_global_matches(path: &Path, matches: &[GlobalOpinionMatch]) -> Result<()> {
    let mut writer = csv_output(path)?;
    writer.write_record([
        "Survey Question ID",
        "Survey Question English Text",
        "Global Data Question Text",
        "Similarity Score",
        "Survey Options",
        "Global Data Options",
        "Turkey Selection Data",
        "Selected Response",
    ])?;

    for m in matches {
        let selection = Literal::List(m.country_selection.iter().map(|v| Literal::Float(*v)).collect());
        writer.write_record([
            m.survey_question_id.clone(),
            m.survey_question_text.clone(),
            m.global_question_text.clone(),
            m.similarity.to_string(),
            format_list(&m.survey_options),
            format_list(&m.global_options),
            selection.to_string(),
            m.selected_response.clone(),
        ])?;
    }
    writer.flush()?;

    info!(target: MATCHING, rows = matches.len(), "Wrote {}", path.display());
    Ok(())
}
