use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::config::{LabelVocabulary, Language};
use crate::logging::EXTRACTION;

static QUESTION_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\nQ(\d+)[.\s]*").expect("question delimiter pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Collapses every whitespace run to one space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// One question as cut out of the raw document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestion<'a> {
    pub question_id: String,
    /// Text between the previous delimiter and this one. For the first
    /// question this is the front matter.
    pub preceding: &'a str,
    /// Text after this delimiter up to the next one.
    pub body: &'a str,
}

/// Splits questionnaire text on `\nQ<digits>` delimiters.
///
/// Text ahead of the first delimiter never becomes a question of its own; it
/// only appears as the `preceding` segment of the first question.
pub fn segment_questions(text: &str) -> Vec<RawQuestion<'_>> {
    let delimiters: Vec<(usize, usize, &str)> = QUESTION_DELIMITER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?;
            Some((whole.start(), whole.end(), number.as_str()))
        })
        .collect();

    let mut questions = Vec::with_capacity(delimiters.len());
    let mut preceding_start = 0;

    for (idx, (start, end, number)) in delimiters.iter().enumerate() {
        let body_end = delimiters
            .get(idx + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(text.len());

        questions.push(RawQuestion {
            question_id: format!("Q{number}"),
            preceding: &text[preceding_start..*start],
            body: &text[*end..body_end],
        });
        preceding_start = *end;
    }

    questions
}

/// The answer labels currently in force while walking a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        LabelSet(labels)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a 1-based answer code.
    pub fn label_for(&self, code: i64) -> Option<&str> {
        let index = usize::try_from(code.checked_sub(1)?).ok()?;
        self.0.get(index).map(String::as_str)
    }
}

/// Finds known answer-label phrases in a segment of questionnaire text.
#[derive(Debug, Clone)]
pub struct LabelRecognizer {
    vocabulary: LabelVocabulary,
    pattern: Option<Regex>,
}

impl LabelRecognizer {
    pub fn new(vocabulary: &LabelVocabulary) -> Self {
        if vocabulary.is_empty() {
            return LabelRecognizer {
                vocabulary: vocabulary.clone(),
                pattern: None,
            };
        }

        let alternation = vocabulary
            .phrases()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        // Escaped literals joined by `|` always form a valid pattern.
        let pattern = Regex::new(&format!(r"\b(?:{alternation})")).ok();

        LabelRecognizer {
            vocabulary: vocabulary.clone(),
            pattern,
        }
    }

    /// Every vocabulary phrase in `segment`, in order of appearance.
    pub fn find_labels(&self, segment: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let segment = normalize_whitespace(segment);
        pattern
            .find_iter(&segment)
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }

    /// Returns the label set in force after reading `segment`: the labels
    /// found there, or `current` unchanged when there are none.
    pub fn advance(&self, current: LabelSet, segment: &str) -> LabelSet {
        let found = self.find_labels(segment);
        if found.is_empty() {
            current
        } else {
            let labels = LabelSet(found);
            trace!(
                target: EXTRACTION,
                labels = ?labels.0,
                language = ?self.language_of(&labels),
                "New response label set"
            );
            labels
        }
    }

    /// Language of the vocabulary entry behind the first label of `labels`.
    pub fn language_of(&self, labels: &LabelSet) -> Option<Language> {
        labels
            .0
            .first()
            .and_then(|label| self.vocabulary.language_of(label))
    }
}
