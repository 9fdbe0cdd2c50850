use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::logging::ALIGNMENT;
use crate::questions::QuestionRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMapping {
    pub turkish: QuestionRecord,
    pub english: QuestionRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub mappings: Vec<QuestionMapping>,
    /// Questions past the end of the shorter document. They are not mapped.
    pub surplus_turkish: Vec<QuestionRecord>,
    pub surplus_english: Vec<QuestionRecord>,
}

impl Alignment {
    pub fn is_balanced(&self) -> bool {
        self.surplus_turkish.is_empty() && self.surplus_english.is_empty()
    }
}

/// Pairs the questions of both documents by position.
///
/// Nothing checks that paired questions mean the same thing. When one
/// document has more questions the extra ones are left unmapped and a
/// warning names the first of them.
pub fn align_questions(turkish: Vec<QuestionRecord>, english: Vec<QuestionRecord>) -> Alignment {
    let paired = turkish.len().min(english.len());

    if turkish.len() != english.len() {
        let (longer, name, first) = if turkish.len() > english.len() {
            (turkish.len(), "Turkish", &turkish[paired].question_id)
        } else {
            (english.len(), "English", &english[paired].question_id)
        };
        warn!(
            target: ALIGNMENT,
            turkish = turkish.len(),
            english = english.len(),
            "Question counts differ; dropping {} {name} questions starting at {first}",
            longer - paired
        );
    }

    let mut turkish = turkish.into_iter();
    let mut english = english.into_iter();

    let mappings: Vec<QuestionMapping> = turkish
        .by_ref()
        .zip(english.by_ref())
        .map(|(turkish, english)| QuestionMapping { turkish, english })
        .collect();

    info!(target: ALIGNMENT, rows = mappings.len(), "Aligned questions");

    Alignment {
        mappings,
        surplus_turkish: turkish.collect(),
        surplus_english: english.collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InconsistencyReason {
    OptionCountMismatch,
    ShowCardMismatch,
}

impl fmt::Display for InconsistencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconsistencyReason::OptionCountMismatch => f.write_str("response option counts differ"),
            InconsistencyReason::ShowCardMismatch => f.write_str("show card on one side only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub mapping: QuestionMapping,
    pub reasons: Vec<InconsistencyReason>,
}

pub fn inconsistency_reasons(mapping: &QuestionMapping) -> Vec<InconsistencyReason> {
    let mut reasons = Vec::new();
    if mapping.turkish.response_options.len() != mapping.english.response_options.len() {
        reasons.push(InconsistencyReason::OptionCountMismatch);
    }
    if mapping.turkish.show_card.is_some() != mapping.english.show_card.is_some() {
        reasons.push(InconsistencyReason::ShowCardMismatch);
    }
    reasons
}

/// Mappings that deserve a manual look. Purely informational.
pub fn find_inconsistencies(mappings: &[QuestionMapping]) -> Vec<Inconsistency> {
    let inconsistencies: Vec<Inconsistency> = mappings
        .iter()
        .filter_map(|mapping| {
            let reasons = inconsistency_reasons(mapping);
            if reasons.is_empty() {
                return None;
            }
            for reason in &reasons {
                info!(
                    target: ALIGNMENT,
                    turkish = %mapping.turkish.question_id,
                    english = %mapping.english.question_id,
                    "Review needed: {reason}"
                );
            }
            Some(Inconsistency {
                mapping: mapping.clone(),
                reasons,
            })
        })
        .collect();

    info!(target: ALIGNMENT, count = inconsistencies.len(), "Flagged inconsistencies");
    inconsistencies
}
