use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Similarity needed before a free-text query is reported as a match.
pub const LOOKUP_THRESHOLD: f64 = 0.75;
/// Similarity needed before a survey question is joined to a global-opinions question.
pub const CROSS_DATASET_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Turkish,
    English,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub phrase: String,
    pub language: Language,
}

/// Closed list of answer-label phrases recognized in questionnaire text.
///
/// Order is significant: when two phrases match at the same offset the one
/// listed first wins, so longer phrases must precede their own prefixes
/// wherever that distinction matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelVocabulary {
    entries: Vec<LabelEntry>,
}

impl LabelVocabulary {
    pub fn new(entries: Vec<LabelEntry>) -> Self {
        LabelVocabulary { entries }
    }

    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.phrase.as_str())
    }

    pub fn language_of(&self, phrase: &str) -> Option<Language> {
        self.entries
            .iter()
            .find(|e| e.phrase == phrase)
            .map(|e| e.language)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        let entries = DEFAULT_LABELS
            .iter()
            .map(|(phrase, language)| LabelEntry {
                phrase: phrase.to_string(),
                language: *language,
            })
            .collect();
        LabelVocabulary { entries }
    }
}

use Language::{English as EN, Turkish as TR};

static DEFAULT_LABELS: &[(&str, Language)] = &[
    ("Kesin Kabul Ederim", TR),
    ("Kabul Ederim", TR),
    ("Kabul Etmem", TR),
    ("Kesin Kabul Etmem", TR),
    ("Kesinlikle Katılmam", TR),
    ("Kesinlikle Kabul Etmem", TR),
    ("İstemem", TR),
    ("Olabilir", TR),
    ("Çok Önemli", TR),
    ("Biraz Önemli", TR),
    ("Pek Önemli Değil", TR),
    ("Hiç Önemli Değil", TR),
    ("Strongly agree", EN),
    ("Agree", EN),
    ("Disagree", EN),
    ("Strongly disagree", EN),
    ("Hard to say", EN),
    ("Kesinlikle Katılırım", TR),
    ("Katılırım", TR),
    ("Ne Katılırım Ne Katılmam", TR),
    ("Katılmam", TR),
    ("Aktif üye", TR),
    ("Pasif üye", TR),
    ("Üye değil", TR),
    ("İyi Olurdu", TR),
    ("Fark Etmezdi", TR),
    ("Kötü Olurdu", TR),
    ("Çok mutluyum", TR),
    ("Biraz mutluyum", TR),
    ("Pek mutlu değilim", TR),
    ("Hiç mutlu değilim", TR),
    ("Çok iyi", TR),
    ("İyi", TR),
    ("Fena değil", TR),
    ("Kötü", TR),
    ("Çok kötü", TR),
    ("Biraz kötü", TR),
    ("Ne iyi ne kötü", TR),
    ("Biraz iyi", TR),
    ("Pek sık rastlanmaz", TR),
    ("Hiç rastlanmaz", TR),
    ("Sık Sık", TR),
    ("Bazen", TR),
    ("Pek Değil", TR),
    ("Hiç Değil", TR),
    ("Tamamen Güvenirim", TR),
    ("Biraz Güvenirim", TR),
    ("Pek Güvenmem", TR),
    ("Hiç Güvenmem", TR),
    ("Çok az sayıda", TR),
    ("Yarıdan az", TR),
    ("Çoğunluk", TR),
    ("Hemen hemen hepsi", TR),
    ("Asla", TR),
    ("Pek değil", TR),
    ("Sıklıkla", TR),
    ("Her zaman", TR),
    ("Çok sık", TR),
    ("Epeyce sık", TR),
    ("Fazla sık değil", TR),
    ("Hiç sık değil", TR),
    ("Çok Endişe Duyuyorum", TR),
    ("Biraz Endişe Duyuyorum", TR),
    ("Pek Endişe Duymuyorum", TR),
    ("Hiç Endişe Duymuyorum", TR),
    ("Günlük", TR),
    ("Haftalık", TR),
    ("Ayda bir", TR),
    ("Ayda birden az", TR),
    ("Hiç", TR),
    ("Yaptım Gerekirse", TR),
    ("Yapabilirim", TR),
    ("Asla Yapmam", TR),
    ("Genellikle", TR),
    ("Hiçbir zaman", TR),
    ("Oy kullanma hakkım yok", TR),
    ("Çok yakın", TR),
    ("Yakın", TR),
    ("Pek yakın değil", TR),
    ("Hiç yakın değil", TR),
    ("Agree strongly", EN),
    ("Neither agree nor disagree", EN),
    ("Disagree strongly", EN),
    ("Good", EN),
    ("Don\u{2019}t mind", EN),
    ("Bad", EN),
    ("Trust completely", EN),
    ("Trust somewhat", EN),
    ("Do not trust very much", EN),
    ("Do not trust at all", EN),
    ("A great deal", EN),
    ("Quite a lot", EN),
    ("Not very much", EN),
    ("None at all", EN),
    ("Active member", EN),
    ("Inactive member", EN),
    ("Don\u{2019}t belong", EN),
    ("None of them", EN),
    ("Few of them", EN),
    ("Most of them", EN),
    ("All of them", EN),
    ("Never", EN),
    ("Rarely", EN),
    ("Frequently", EN),
    ("Always", EN),
    ("Very good", EN),
    ("Quite good", EN),
    ("Neither good,nor bad", EN),
    ("Quite bad", EN),
    ("Very bad", EN),
    ("Very frequently", EN),
    ("Quite frequently", EN),
    ("Not frequently", EN),
    ("Not at all frequently", EN),
    ("Very much", EN),
    ("A good deal", EN),
    ("Not much", EN),
    ("Not at all", EN),
    ("Very close", EN),
    ("Close", EN),
    ("Not very close", EN),
    ("Not close at all", EN),
    ("First choice", EN),
    ("Second choice", EN),
    ("Completely disagree", EN),
    ("Completely agree", EN),
    ("Fairly good", EN),
    ("Fairly bad", EN),
    ("Daily", EN),
    ("Weekly", EN),
    ("Monthly", EN),
    ("Less than monthly", EN),
    ("Have done", EN),
    ("Might do", EN),
    ("Would never do", EN),
    ("Usually", EN),
    ("Not allowed to vote", EN),
    ("Very often", EN),
    ("Fairly often", EN),
    ("Not often", EN),
    ("Not at all often", EN),
    ("Mentioned", EN),
    ("Not mentioned", EN),
    ("Belirtildi", TR),
    ("Belirtilmedi", TR),
    ("Very important", EN),
    ("Rather important", EN),
    ("Not very important", EN),
    ("Not at all important", EN),
];

/// Settings for one questionnaire extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub labels: LabelVocabulary,
    /// Body text from the first occurrence of any marker onward is discarded.
    pub exclusion_markers: Vec<String>,
    pub no_opinion: String,
    pub no_answer: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            labels: LabelVocabulary::default(),
            exclusion_markers: vec![
                "Cevapsız soruların kodları".to_string(),
                "SHOW CARD".to_string(),
            ],
            no_opinion: "no opinion".to_string(),
            no_answer: "no answer".to_string(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid extractor configuration")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn with_sentinels(mut self, no_opinion: &str, no_answer: &str) -> Self {
        self.no_opinion = no_opinion.to_string();
        self.no_answer = no_answer.to_string();
        self
    }
}
