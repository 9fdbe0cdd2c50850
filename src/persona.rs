use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::demographics::{age_group_tr, region_cities, Attribute, AGE_30_TO_49, AGE_UNDER_30};
use crate::logging::TABULATION;
use crate::microdata::Microdata;
use crate::table::csv_output;

const MALE_NAMES: &[&str] = &[
    "Mehmet", "Mustafa", "Ahmet", "Ali", "Hüseyin", "Hasan", "İbrahim", "İsmail", "Osman",
    "Yusuf", "Murat", "Ömer", "Ramazan", "Halil", "Süleyman", "Abdullah", "Mahmut", "Recep",
    "Salih", "Fatih", "Kadir", "Emre", "Hakan", "Adem", "Kemal", "Yaşar", "Bekir", "Musa",
    "Metin", "Serkan",
];

const FEMALE_NAMES: &[&str] = &[
    "Fatma", "Ayşe", "Emine", "Hatice", "Zeynep", "Elif", "Meryem", "Selma", "Şerife", "Zehra",
    "Sultan", "Hanife", "Merve", "Havva", "Zeliha", "Esra", "Fadime", "Özlem", "Hacer",
    "Yasemin", "Melek", "Rabia", "Hülya", "Cemile", "Sevim", "Gülsüm", "Leyla", "Dilek", "Büşra",
    "Aysel",
];

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("parenthetical pattern"));

static AGE_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3}) yasinda\b").expect("age mention pattern"));

pub type PersonaKey = [&'static str; 9];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub attributes: PersonaKey,
    pub count: usize,
    pub description: String,
}

impl Persona {
    pub fn attribute(&self, attribute: Attribute) -> &'static str {
        self.attributes[attribute as usize]
    }
}

fn persona_columns(data: &Microdata) -> Result<[usize; 9]> {
    let mut columns = [0usize; 9];
    let mut missing = Vec::new();
    for (slot, attribute) in columns.iter_mut().zip(Attribute::ALL) {
        match data.column(attribute.variable()) {
            Some(column) => *slot = column,
            None => missing.push(attribute.variable()),
        }
    }
    if !missing.is_empty() {
        bail!("Microdata lacks persona columns: {}", missing.join(", "));
    }
    Ok(columns)
}

/// All nine attribute labels for one respondent, or `None` when any is missing.
pub fn respondent_key(
    data: &Microdata,
    row: usize,
    columns: &[usize; 9],
) -> Option<PersonaKey> {
    let mut key = [""; 9];
    for (slot, (attribute, column)) in key.iter_mut().zip(Attribute::ALL.iter().zip(columns)) {
        *slot = attribute.label(data.int(row, *column)?)?;
    }
    Some(key)
}

fn age_for(age_group: &str, ordinal: usize) -> usize {
    let (low, high) = match age_group {
        AGE_UNDER_30 => (18, 29),
        AGE_30_TO_49 => (30, 49),
        _ => (50, 90),
    };
    low + ordinal % (high - low + 1)
}

/// One-sentence description of a persona. Name, age and city are chosen
/// from `ordinal` so repeated runs produce the same text.
pub fn describe(key: &PersonaKey, ordinal: usize) -> String {
    let get = |attribute: Attribute| key[attribute as usize];
    let gender = get(Attribute::Gender);

    let names = if gender == "Kadın" {
        FEMALE_NAMES
    } else {
        MALE_NAMES
    };
    let name = names[ordinal % names.len()];
    let age = age_for(get(Attribute::AgeGroup), ordinal);

    let cities = region_cities(get(Attribute::Region));
    let city = cities
        .get(ordinal % cities.len().max(1))
        .copied()
        .unwrap_or_default();

    format!(
        "{name}, {age} yaşında {} bir {}, {}, {}, {city} şehrinde {} yaşayan, \
         kendi sosyal sınıfını {} olarak tanımlayan, {} birisidir.",
        get(Attribute::MaritalStatus).to_lowercase(),
        gender.to_lowercase(),
        get(Attribute::Children).to_lowercase(),
        get(Attribute::Education).to_lowercase(),
        get(Attribute::Settlement).to_lowercase(),
        get(Attribute::SocialClass).to_lowercase(),
        get(Attribute::Employment).to_lowercase(),
    )
}

/// Counts respondents per full attribute combination, dropping anyone with a
/// missing attribute. Personas come back ordered by their attribute values.
pub fn group_personas(data: &Microdata) -> Result<Vec<Persona>> {
    let columns = persona_columns(data)?;

    let mut groups: BTreeMap<PersonaKey, usize> = BTreeMap::new();
    let mut dropped = 0;
    for row in 0..data.len() {
        match respondent_key(data, row, &columns) {
            Some(key) => *groups.entry(key).or_insert(0) += 1,
            None => dropped += 1,
        }
    }
    debug!(target: TABULATION, dropped, "Respondents without a complete profile");

    let personas: Vec<Persona> = groups
        .into_iter()
        .enumerate()
        .map(|(ordinal, (attributes, count))| Persona {
            description: describe(&attributes, ordinal),
            attributes,
            count,
        })
        .collect();

    let total: usize = personas.iter().map(|p| p.count).sum();
    info!(target: TABULATION, personas = personas.len(), "Total matched personas: {total}");
    Ok(personas)
}

/// Lowercases Turkish text and folds it to plain Latin letters, so
/// `"Bekâr"`, `"BEKAR"` and `"bekar"` compare equal.
pub fn fold_turkish(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

fn contains_word(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Persona attributes recognized in a free-text description.
///
/// The region slot holds a city name rather than a region label; it matches
/// any respondent whose region lists that city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaFeatures {
    values: [Option<&'static str>; 9],
}

impl PersonaFeatures {
    pub fn get(&self, attribute: Attribute) -> Option<&'static str> {
        self.values[attribute as usize]
    }

    pub fn set(&mut self, attribute: Attribute, value: &'static str) {
        self.values[attribute as usize] = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Whether a respondent profile satisfies every recognized attribute.
    pub fn matches(&self, key: &PersonaKey) -> bool {
        Attribute::ALL.iter().all(|attribute| {
            let actual = key[*attribute as usize];
            match self.get(*attribute) {
                None => true,
                Some(city) if *attribute == Attribute::Region => {
                    region_cities(actual).contains(&city)
                }
                Some(expected) => actual == expected,
            }
        })
    }
}

/// Reads persona attributes back out of a Turkish description such as the
/// ones [`describe`] writes. Text in parentheses is ignored; for each
/// attribute the first known label found as a whole phrase wins.
pub fn parse_description(description: &str) -> PersonaFeatures {
    let text = fold_turkish(&PARENTHETICAL.replace_all(description, ""));
    let mut features = PersonaFeatures::default();

    for attribute in Attribute::ALL {
        let found = match attribute {
            Attribute::AgeGroup => AGE_MENTION
                .captures(&text)
                .and_then(|caps| caps.get(1)?.as_str().parse::<i64>().ok())
                .and_then(age_group_tr),
            Attribute::Region => attribute
                .labels()
                .into_iter()
                .flat_map(region_cities)
                .find(|city| contains_word(&text, &fold_turkish(city))),
            _ => attribute
                .labels()
                .into_iter()
                .find(|label| contains_word(&text, &fold_turkish(label))),
        };
        if let Some(value) = found {
            features.set(attribute, value);
        }
    }

    debug!(target: TABULATION, ?features, "Parsed persona description");
    features
}

/// One flag per respondent: does the profile fit `features`? With no
/// recognized attribute every respondent fits, complete profile or not.
pub fn matching_respondents(data: &Microdata, features: &PersonaFeatures) -> Result<Vec<bool>> {
    if features.is_empty() {
        return Ok(vec![true; data.len()]);
    }

    let columns = persona_columns(data)?;
    Ok((0..data.len())
        .map(|row| respondent_key(data, row, &columns).is_some_and(|key| features.matches(&key)))
        .collect())
}

pub fn write_personas(path: &Path, personas: &[Persona]) -> Result<()> {
    let mut writer = csv_output(path)?;

    let mut header: Vec<&str> = Attribute::ALL.iter().map(|a| a.column_name()).collect();
    header.extend(["Count", "Prompt"]);
    writer.write_record(&header)?;

    for persona in personas {
        let count = persona.count.to_string();
        let mut record: Vec<&str> = persona.attributes.to_vec();
        record.push(&count);
        record.push(&persona.description);
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(target: TABULATION, rows = personas.len(), "Wrote {}", path.display());
    Ok(())
}
