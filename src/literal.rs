use std::fmt;

use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use pest::iterators::Pair;
use pest::Parser as PestParser;
use pest_derive::Parser as PestParserDerive;
use regex::Regex;
use tracing::{debug, warn};

use crate::logging::EXTRACTION;

#[derive(PestParserDerive)]
#[grammar = "literal.pest"]
pub struct LiteralParser;

static DEFAULTDICT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"defaultdict\(.*?, ").expect("defaultdict pattern"));

/// A value written in Python literal notation, as found in the survey CSV cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    /// Value stored under a string key, when `self` is a dict.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Literal::Dict(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(&quote(s)),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::None => f.write_str("None"),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Literal::Dict(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

pub fn parse_literal(text: &str) -> Result<Literal> {
    let root = LiteralParser::parse(Rule::literal, text)
        .map_err(|e| anyhow!("Invalid literal: {e}"))?
        .next()
        .ok_or_else(|| anyhow!("Empty literal"))?;

    let value = root
        .into_inner()
        .find(|pair| pair.as_rule() != Rule::EOI)
        .ok_or_else(|| anyhow!("Empty literal"))?;

    build_literal(value)
}

fn build_literal(pair: Pair<Rule>) -> Result<Literal> {
    match pair.as_rule() {
        Rule::list | Rule::tuple => pair
            .into_inner()
            .map(build_literal)
            .collect::<Result<Vec<_>>>()
            .map(Literal::List),
        Rule::dict => {
            let mut pairs = Vec::new();
            for entry in pair.into_inner() {
                let mut kv = entry.into_inner();
                let (Some(key), Some(value)) = (kv.next(), kv.next()) else {
                    bail!("Incomplete dict entry");
                };
                pairs.push((build_literal(key)?, build_literal(value)?));
            }
            Ok(Literal::Dict(pairs))
        }
        Rule::string => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| anyhow!("Unterminated string"))?;
            Ok(Literal::Str(unescape(inner.as_str())))
        }
        Rule::number => {
            let raw = pair.as_str();
            if raw.contains(['.', 'e', 'E']) {
                Ok(Literal::Float(raw.parse()?))
            } else {
                Ok(raw
                    .parse::<i64>()
                    .map(Literal::Int)
                    .or_else(|_| raw.parse::<f64>().map(Literal::Float))?)
            }
        }
        Rule::none => Ok(Literal::None),
        Rule::boolean => Ok(Literal::Bool(pair.as_str() == "True")),
        other => bail!("Unexpected literal element {other:?}"),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(kind @ ('x' | 'u')) => {
                let width = if kind == 'x' { 2 } else { 4 };
                let digits: String = chars.by_ref().take(width).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Quotes a string the way Python's `repr` does.
pub fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Renders response options as a list literal, e.g. `['Agree', 'Disagree']`.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

pub fn parse_list(text: &str) -> Result<Vec<String>> {
    match parse_literal(text)? {
        Literal::List(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::Str(s) => Ok(s),
                Literal::Int(_) | Literal::Float(_) => Ok(item.to_string()),
                other => bail!("Unsupported list element {other}"),
            })
            .collect(),
        other => bail!("Expected a list, found {other}"),
    }
}

/// Parses a response-option cell, repairing what it can. Cells that still
/// cannot be read are logged and treated as an empty list.
pub fn parse_list_lenient(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    if let Ok(items) = parse_list(cell) {
        return items;
    }

    let repaired = repair_list(cell);
    match parse_list(&repaired) {
        Ok(items) if !items.is_empty() => {
            debug!(target: EXTRACTION, "Repaired option cell {cell:?} as {repaired}");
            items
        }
        Ok(_) => {
            warn!(target: EXTRACTION, "Option cell has no usable elements: {cell:?}");
            Vec::new()
        }
        Err(e) => {
            warn!(target: EXTRACTION, "Unreadable option list {cell:?}: {e:#}");
            Vec::new()
        }
    }
}

/// Rebuilds a damaged list cell: missing brackets are added, and every
/// top-level element is stripped of stray quotes and quoted again.
/// Elements left empty are dropped.
fn repair_list(cell: &str) -> String {
    let flattened = cell.replace('\n', " ");
    let body = flattened.trim();
    let body = body.strip_prefix('[').unwrap_or(body);
    let body = body.strip_suffix(']').unwrap_or(body);

    let elements: Vec<&str> = split_elements(body)
        .into_iter()
        .map(|element| element.trim().trim_matches(['\'', '"']).trim())
        .filter(|element| !element.is_empty())
        .collect();

    format_list(&elements)
}

/// Splits on commas that are not nested inside brackets, parentheses or braces.
fn split_elements(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let (mut depth, mut start) = (0usize, 0);

    for (idx, c) in body.char_indices() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Unwraps a `defaultdict(<factory>, {...})` rendering down to its dict.
pub fn strip_defaultdict(text: &str) -> String {
    if DEFAULTDICT_PREFIX.is_match(text) {
        DEFAULTDICT_PREFIX
            .replace_all(text, "")
            .trim_end()
            .trim_end_matches(')')
            .to_string()
    } else {
        text.to_string()
    }
}
