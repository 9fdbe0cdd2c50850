use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::align::{Inconsistency, QuestionMapping};
use crate::literal::{format_list, parse_list_lenient};
use crate::logging::ALIGNMENT;
use crate::questions::QuestionRecord;

pub const MAPPING_COLUMNS: [&str; 8] = [
    "Turkish Question ID",
    "Turkish Question Text",
    "Turkish Response Options",
    "Turkish Show Card",
    "English Question ID",
    "English Question Text",
    "English Response Options",
    "English Show Card",
];

/// One line of `survey_question_mapping.csv` as it appears on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    #[serde(rename = "Turkish Question ID")]
    pub turkish_question_id: String,
    #[serde(rename = "Turkish Question Text", default)]
    pub turkish_question_text: String,
    #[serde(rename = "Turkish Response Options", default)]
    pub turkish_response_options: String,
    #[serde(rename = "Turkish Show Card", default)]
    pub turkish_show_card: Option<String>,
    #[serde(rename = "English Question ID")]
    pub english_question_id: String,
    #[serde(rename = "English Question Text", default)]
    pub english_question_text: String,
    #[serde(rename = "English Response Options", default)]
    pub english_response_options: String,
    #[serde(rename = "English Show Card", default)]
    pub english_show_card: Option<String>,
}

impl From<&QuestionMapping> for MappingRow {
    fn from(mapping: &QuestionMapping) -> Self {
        MappingRow {
            turkish_question_id: mapping.turkish.question_id.clone(),
            turkish_question_text: mapping.turkish.question_text.clone(),
            turkish_response_options: format_list(&mapping.turkish.response_options),
            turkish_show_card: mapping.turkish.show_card.clone(),
            english_question_id: mapping.english.question_id.clone(),
            english_question_text: mapping.english.question_text.clone(),
            english_response_options: format_list(&mapping.english.response_options),
            english_show_card: mapping.english.show_card.clone(),
        }
    }
}

impl From<MappingRow> for QuestionMapping {
    fn from(row: MappingRow) -> Self {
        QuestionMapping {
            turkish: QuestionRecord {
                question_id: row.turkish_question_id,
                question_text: row.turkish_question_text,
                response_options: parse_list_lenient(&row.turkish_response_options),
                show_card: row.turkish_show_card.filter(|card| !card.is_empty()),
            },
            english: QuestionRecord {
                question_id: row.english_question_id,
                question_text: row.english_question_text,
                response_options: parse_list_lenient(&row.english_response_options),
                show_card: row.english_show_card.filter(|card| !card.is_empty()),
            },
        }
    }
}

pub fn write_mapping_rows<'a, W, I>(writer: W, mappings: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a QuestionMapping>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    // Written explicitly so an empty table still carries its header.
    csv_writer.write_record(MAPPING_COLUMNS)?;

    let mut count = 0;
    for mapping in mappings {
        let row = MappingRow::from(mapping);
        csv_writer.write_record([
            row.turkish_question_id.as_str(),
            row.turkish_question_text.as_str(),
            row.turkish_response_options.as_str(),
            row.turkish_show_card.as_deref().unwrap_or(""),
            row.english_question_id.as_str(),
            row.english_question_text.as_str(),
            row.english_response_options.as_str(),
            row.english_show_card.as_deref().unwrap_or(""),
        ])?;
        count += 1;
    }
    csv_writer.flush()?;
    Ok(count)
}

fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Creates `path` and its parent directories and returns a CSV writer on it.
pub fn csv_output(path: &Path) -> Result<csv::Writer<File>> {
    Ok(csv::Writer::from_writer(create_output(path)?))
}

pub fn write_mappings(path: &Path, mappings: &[QuestionMapping]) -> Result<()> {
    let count = write_mapping_rows(create_output(path)?, mappings)?;
    info!(target: ALIGNMENT, rows = count, "Wrote {}", path.display());
    Ok(())
}

pub fn write_inconsistencies(path: &Path, inconsistencies: &[Inconsistency]) -> Result<()> {
    let count = write_mapping_rows(
        create_output(path)?,
        inconsistencies.iter().map(|i| &i.mapping),
    )?;
    info!(target: ALIGNMENT, rows = count, "Wrote {}", path.display());
    Ok(())
}

/// Reads mapping rows. Rows that do not fit the schema are logged and skipped.
pub fn read_mapping_rows<R: Read>(reader: R) -> Result<Vec<MappingRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<MappingRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => warn!(target: ALIGNMENT, "Skipping mapping row {index}: {e}"),
        }
    }

    Ok(rows)
}

pub fn read_mappings(path: &Path) -> Result<Vec<QuestionMapping>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(read_mapping_rows(file)?
        .into_iter()
        .map(QuestionMapping::from)
        .collect())
}
