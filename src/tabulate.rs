use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::align::QuestionMapping;
use crate::demographics::{Slice, AGE, CHILDREN, GENDER, MARITAL_STATUS, TABULATION_SLICES};
use crate::logging::TABULATION;
use crate::microdata::Microdata;
use crate::table::csv_output;

/// Non-substantive answers appended after the printed options, with their WVS codes.
pub const ADDITIONAL_RESPONSES: [(&str, i64); 3] = [
    ("Don\u{2019}t know", -1),
    ("No answer", -2),
    ("Other missing; Multiple answers Mail (EVS)", -5),
];

const REQUIRED_COLUMNS: [&str; 4] = [GENDER, AGE, MARITAL_STATUS, CHILDREN];

#[derive(Debug, Clone, PartialEq)]
pub struct TabulationRow {
    pub question_id: String,
    pub question_text: String,
    pub response_option: String,
    pub total: f64,
    /// One value per entry of [`TABULATION_SLICES`], in the same order.
    pub slices: Vec<f64>,
}

/// Share of `answers` equal to `code` among respondents selected by `include`
/// who gave any answer at all, as a percentage. Empty selections give 0.
pub fn percentage<F>(answers: &[Option<i64>], code: i64, include: F) -> f64
where
    F: Fn(usize) -> bool,
{
    let (answered, chosen) = answers
        .iter()
        .enumerate()
        .filter(|(row, _)| include(*row))
        .filter_map(|(_, answer)| *answer)
        .fold((0usize, 0usize), |(answered, chosen), answer| {
            (answered + 1, chosen + usize::from(answer == code))
        });

    if answered == 0 {
        0.0
    } else {
        chosen as f64 * 100.0 / answered as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDistribution {
    /// Selected respondents who answered the question.
    pub respondents: usize,
    /// Percentage of those respondents per answer code, in code order.
    pub shares: Vec<(i64, f64)>,
}

/// How the respondents selected by `include` answered `question_id`.
/// `None` when the microdata has no such column.
pub fn response_distribution<F>(
    data: &Microdata,
    question_id: &str,
    include: F,
) -> Option<ResponseDistribution>
where
    F: Fn(usize) -> bool,
{
    let answers = data.int_column(question_id)?;

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for answer in answers
        .iter()
        .enumerate()
        .filter(|(row, _)| include(*row))
        .filter_map(|(_, answer)| *answer)
    {
        *counts.entry(answer).or_insert(0) += 1;
    }

    let respondents: usize = counts.values().sum();
    let shares = counts
        .into_iter()
        .map(|(code, count)| (code, count as f64 * 100.0 / respondents as f64))
        .collect();

    Some(ResponseDistribution {
        respondents,
        shares,
    })
}

fn slice_members(data: &Microdata, slice: &Slice) -> Vec<bool> {
    data.int_column(slice.variable)
        .map(|values| {
            values
                .into_iter()
                .map(|v| v.is_some_and(|v| slice.contains(v)))
                .collect()
        })
        .unwrap_or_else(|| vec![false; data.len()])
}

/// Per-option percentages for one question, overall and by demographic slice.
pub fn tabulate_question(
    data: &Microdata,
    question_id: &str,
    question_text: &str,
    options: &[String],
    slice_masks: &[Vec<bool>],
) -> Option<Vec<TabulationRow>> {
    let answers = data.int_column(question_id)?;

    let coded = options
        .iter()
        .map(String::as_str)
        .zip(1i64..)
        .chain(ADDITIONAL_RESPONSES);

    let rows = coded
        .map(|(option, code)| TabulationRow {
            question_id: question_id.to_string(),
            question_text: question_text.to_string(),
            response_option: option.to_string(),
            total: percentage(&answers, code, |_| true),
            slices: slice_masks
                .iter()
                .map(|mask| percentage(&answers, code, |row| mask[row]))
                .collect(),
        })
        .collect();

    Some(rows)
}

pub fn tabulate(data: &Microdata, mappings: &[QuestionMapping]) -> Vec<TabulationRow> {
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !data.has_column(c)) {
        warn!(target: TABULATION, "Microdata lacks {missing}; nothing to tabulate");
        return Vec::new();
    }

    let slice_masks: Vec<Vec<bool>> = TABULATION_SLICES
        .iter()
        .map(|slice| slice_members(data, slice))
        .collect();

    let mut rows = Vec::new();
    for (index, mapping) in mappings.iter().enumerate() {
        let english = &mapping.english;
        if english.response_options.is_empty() {
            warn!(target: TABULATION, "Skipping row {index}: no English response options");
            continue;
        }
        match tabulate_question(
            data,
            &english.question_id,
            &english.question_text,
            &english.response_options,
            &slice_masks,
        ) {
            Some(question_rows) => rows.extend(question_rows),
            None => debug!(
                target: TABULATION,
                "Skipping row {index}: no microdata column {}",
                english.question_id
            ),
        }
    }

    info!(target: TABULATION, rows = rows.len(), "Tabulated responses");
    rows
}

pub fn format_percentage(value: f64) -> String {
    format!("%{value:.2}")
}

pub fn write_tabulation(path: &Path, rows: &[TabulationRow]) -> Result<()> {
    if rows.is_empty() {
        warn!(target: TABULATION, "No valid data to output");
        return Ok(());
    }

    let mut writer = csv_output(path)?;

    let mut header = vec![
        "Survey Question ID",
        "Survey Question English Text",
        "Response Option",
        "Total",
    ];
    header.extend(TABULATION_SLICES.iter().map(|s| s.name));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.question_id.clone(),
            row.question_text.clone(),
            row.response_option.clone(),
            format_percentage(row.total),
        ];
        record.extend(row.slices.iter().copied().map(format_percentage));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(target: TABULATION, rows = rows.len(), "Wrote {}", path.display());
    Ok(())
}
