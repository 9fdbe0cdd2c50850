use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::logging::EXTRACTION;
use crate::segment::{normalize_whitespace, segment_questions, LabelRecognizer, LabelSet, RawQuestion};

pub const SHOW_CARD_MARKER: &str = "SHOW CARD";

static CARD_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\nQ\d+").expect("card end pattern"));

static RESPONSE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").expect("response value pattern"));

// A numeral followed by whitespace opens the numbered answer list.
static ANSWER_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s+[^\n]+").expect("answer list pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_id: String,
    pub question_text: String,
    pub response_options: Vec<String>,
    pub show_card: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCard {
    pub id: String,
    pub raw_text: String,
}

/// Collects every `SHOW CARD` block, each running to the next question
/// delimiter or the end of the text. Ids are assigned in document order.
pub fn extract_show_cards(text: &str) -> Vec<ShowCard> {
    let mut cards = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(SHOW_CARD_MARKER) {
        let start = cursor + offset;
        let end = CARD_END
            .find_at(text, start + SHOW_CARD_MARKER.len())
            .map(|m| m.start())
            .unwrap_or(text.len());

        cards.push(ShowCard {
            id: format!("SHOW_CARD_{}", cards.len() + 1),
            raw_text: text[start..end].trim().to_string(),
        });
        cursor = end;
    }

    cards
}

/// Replaces each numeral in `text` with the label it codes for.
///
/// `-1` and `-2` are the fixed no-opinion and no-answer codes. Any other
/// value indexes `labels` from 1; a value with no label is kept as written.
pub fn substitute_responses(
    text: &str,
    labels: &LabelSet,
    no_opinion: &str,
    no_answer: &str,
) -> Vec<String> {
    RESPONSE_VALUE
        .find_iter(text)
        .map(|m| match m.as_str() {
            "-1" => no_opinion.to_string(),
            "-2" => no_answer.to_string(),
            value => value
                .parse::<i64>()
                .ok()
                .and_then(|code| labels.label_for(code))
                .unwrap_or(value)
                .to_string(),
        })
        .collect()
}

pub struct QuestionExtractor {
    config: ExtractorConfig,
    recognizer: LabelRecognizer,
    exclusions: Vec<Regex>,
}

impl QuestionExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let recognizer = LabelRecognizer::new(&config.labels);
        let exclusions = config
            .exclusion_markers
            .iter()
            .filter_map(|marker| Regex::new(&format!(r"\b{}", regex::escape(marker))).ok())
            .collect();

        QuestionExtractor {
            config,
            recognizer,
            exclusions,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Whitespace-collapsed body with everything after an exclusion marker removed.
    pub fn clean_body(&self, body: &str) -> String {
        let mut cleaned = normalize_whitespace(body);
        for exclusion in &self.exclusions {
            if let Some(m) = exclusion.find(&cleaned) {
                cleaned.truncate(m.start());
            }
        }
        cleaned.truncate(cleaned.trim_end().len());
        cleaned
    }

    /// Walks the document once, in order, threading the label set from each
    /// question into the next.
    pub fn extract_questions(&self, text: &str) -> Vec<QuestionRecord> {
        let show_cards = extract_show_cards(text);
        debug!(target: EXTRACTION, count = show_cards.len(), "Extracted show cards");

        let (_, records) = segment_questions(text).into_iter().fold(
            (LabelSet::default(), Vec::new()),
            |(labels, mut records), raw| {
                let labels = self.recognizer.advance(labels, raw.preceding);
                records.push(self.build_record(&raw, &labels, &show_cards));
                (labels, records)
            },
        );

        info!(target: EXTRACTION, count = records.len(), "Extracted questions");
        records
    }

    fn build_record(
        &self,
        raw: &RawQuestion<'_>,
        labels: &LabelSet,
        show_cards: &[ShowCard],
    ) -> QuestionRecord {
        let body = self.clean_body(raw.body);

        let response_options = substitute_responses(
            &body,
            labels,
            &self.config.no_opinion,
            &self.config.no_answer,
        );

        let question_text = ANSWER_LIST.replace_all(&body, "").trim().to_string();

        let show_card = show_cards
            .iter()
            .find(|card| body.contains(&card.id))
            .map(|card| card.raw_text.clone());

        QuestionRecord {
            question_id: raw.question_id.clone(),
            question_text,
            response_options,
            show_card,
        }
    }
}

impl Default for QuestionExtractor {
    fn default() -> Self {
        QuestionExtractor::new(ExtractorConfig::default())
    }
}
