//! INI-style configuration text
//!
//! ```text
//! # comment
//! [project]
//! description = Regional downscaling, 12 km
//! reference_period = [1981,2010]
//! horizons: [[2021,2050],[2041,2070]]
//! ```
//!
//! Keys are case-insensitive (stored lowercased); section names are kept
//! verbatim. Lines starting with `#` or `;` are comments. Values are raw
//! strings; bracketed array literals are decoded on demand with
//! [`ArrayValue::parse`].

use crate::error::{ConnectionError, Result};
use std::collections::BTreeMap;

/// One `[section]` and its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: BTreeMap<String, String>,
}

impl IniSection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value of a key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value of a key decoded as an array literal
    pub fn get_array(&self, key: &str) -> Result<Option<ArrayValue>> {
        self.get(key).map(ArrayValue::parse).transpose()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Parsed INI document; sections keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: Vec<IniSection> = Vec::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| ConnectionError::parse(line_no, "unterminated section header"))?
                    .trim();
                if name.is_empty() {
                    return Err(ConnectionError::parse(line_no, "empty section name"));
                }
                // Repeated headers continue the earlier section
                current = match sections.iter().position(|s| s.name == name) {
                    Some(pos) => Some(pos),
                    None => {
                        sections.push(IniSection {
                            name: name.to_string(),
                            entries: BTreeMap::new(),
                        });
                        Some(sections.len() - 1)
                    }
                };
                continue;
            }

            let split = line
                .find(['=', ':'])
                .ok_or_else(|| ConnectionError::parse(line_no, "expected `key = value`"))?;
            let key = line[..split].trim().to_ascii_lowercase();
            let value = line[split + 1..].trim().to_string();
            if key.is_empty() {
                return Err(ConnectionError::parse(line_no, "empty key"));
            }

            let section = current
                .and_then(|pos| sections.get_mut(pos))
                .ok_or_else(|| ConnectionError::parse(line_no, "entry outside of any section"))?;
            section.entries.insert(key, value);
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }

    /// Raw value of `key` in `section`
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }
}

/// A scalar or a (possibly nested) bracketed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayValue {
    Scalar(String),
    List(Vec<ArrayValue>),
}

impl ArrayValue {
    /// Decode `a`, `[a,b,c]` or `[[a,b],[c,d]]`.
    ///
    /// Each bracket layer is stripped and its contents split on commas at
    /// nesting depth zero. Items are trimmed and surrounding quotes removed.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        match trimmed.strip_prefix('[') {
            Some(open) => {
                let inner = open
                    .strip_suffix(']')
                    .ok_or_else(|| ConnectionError::array(text, "missing closing bracket"))?;
                if inner.trim().is_empty() {
                    return Ok(ArrayValue::List(Vec::new()));
                }
                split_top_level(inner)
                    .ok_or_else(|| ConnectionError::array(text, "unbalanced brackets"))?
                    .into_iter()
                    .map(ArrayValue::parse)
                    .collect::<Result<Vec<_>>>()
                    .map(ArrayValue::List)
            }
            None if trimmed.contains(['[', ']']) => {
                Err(ConnectionError::array(text, "unexpected bracket"))
            }
            None => Ok(ArrayValue::Scalar(unquote(trimmed).to_string())),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ArrayValue::Scalar(s) => Some(s),
            ArrayValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArrayValue]> {
        match self {
            ArrayValue::List(items) => Some(items),
            ArrayValue::Scalar(_) => None,
        }
    }

    /// Nesting depth: 0 for a scalar, 1 for `[a,b]`, 2 for `[[a],[b]]`.
    pub fn depth(&self) -> usize {
        match self {
            ArrayValue::Scalar(_) => 0,
            ArrayValue::List(items) => 1 + items.iter().map(ArrayValue::depth).max().unwrap_or(0),
        }
    }

    /// Items of a 1-D list; a bare scalar reads as a one-item list.
    pub fn to_strings(&self) -> Option<Vec<String>> {
        match self {
            ArrayValue::Scalar(s) => Some(vec![s.clone()]),
            ArrayValue::List(items) => items
                .iter()
                .map(|item| item.as_scalar().map(str::to_string))
                .collect(),
        }
    }

    /// Rows of a 2-D list.
    pub fn to_rows(&self) -> Option<Vec<Vec<String>>> {
        self.as_list()?
            .iter()
            .map(|row| row.as_list().and(row.to_strings()))
            .collect()
    }
}

/// Split on commas that are not nested inside brackets.
fn split_top_level(text: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&text[start..]);
    Some(parts)
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}
