use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::logging::TABULATION;

/// Respondent-level survey data, one row per interview.
#[derive(Debug, Clone, Default)]
pub struct Microdata {
    columns: IndexMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Microdata {
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let columns = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), idx))
            .collect();

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            match record {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
                Err(e) => warn!(target: TABULATION, "Skipping respondent row {index}: {e}"),
            }
        }

        Ok(Microdata { columns, rows })
    }

    /// Reads the `;`-delimited WVS export.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let data = Self::from_reader(file, b';')?;
        info!(
            target: TABULATION,
            respondents = data.len(),
            columns = data.columns.len(),
            "Loaded {}",
            path.display()
        );
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Integer value of a cell. Blank and non-numeric cells are missing.
    pub fn int(&self, row: usize, column: usize) -> Option<i64> {
        let raw = self.cell(row, column)?.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
    }

    /// Integer value of a named column, for every respondent.
    pub fn int_column(&self, name: &str) -> Option<Vec<Option<i64>>> {
        let column = self.column(name)?;
        Some((0..self.rows.len()).map(|row| self.int(row, column)).collect())
    }
}
