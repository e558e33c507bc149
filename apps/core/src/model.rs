use serde::{Deserialize, Serialize};

pub const NO_RESULT_TEXT: &str = "No result";

pub const ERROR_ROW_ID: i64 = -1;
pub const NO_RESULT_ROW_ID: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Error,
    NoResult,
    Match,
}

impl RowKind {
    pub fn from_id(id: i64) -> Self {
        match id {
            i64::MIN..=-1 => Self::Error,
            0 => Self::NoResult,
            _ => Self::Match,
        }
    }
}

/// A row shown under the input. `id` doubles as the row kind tag and, for
/// matches, the 1-based position inside the current result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: i64,
    pub value: String,
}

impl ResultRow {
    pub fn matched(position: usize, value: String) -> Self {
        Self {
            id: position as i64,
            value,
        }
    }

    pub fn no_result() -> Self {
        Self {
            id: NO_RESULT_ROW_ID,
            value: NO_RESULT_TEXT.to_string(),
        }
    }

    pub fn error(text: String) -> Self {
        Self {
            id: ERROR_ROW_ID,
            value: text,
        }
    }

    pub fn kind(&self) -> RowKind {
        RowKind::from_id(self.id)
    }
}

pub fn rows_from_matches(matches: Vec<String>) -> Vec<ResultRow> {
    if matches.is_empty() {
        return vec![ResultRow::no_result()];
    }

    matches
        .into_iter()
        .enumerate()
        .map(|(index, value)| ResultRow::matched(index + 1, value))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub loading: bool,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub text: String,
    pub weight: u32,
    normalized: String,
}

impl CatalogEntry {
    pub fn new(text: &str) -> Self {
        Self::weighted(text.to_string(), 0)
    }

    pub fn weighted(text: String, weight: u32) -> Self {
        let normalized = normalize_for_search(&text);
        Self {
            text,
            weight,
            normalized,
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

pub fn normalize_for_search(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
