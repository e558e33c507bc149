use crate::model::{ResultRow, RowKind, SearchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub key: i64,
    pub text: String,
    pub kind: RowKind,
}

impl DisplayRow {
    fn from_row(row: &ResultRow) -> Self {
        Self {
            key: row.id,
            text: row.value.clone(),
            kind: row.kind(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        class_name(self.kind)
    }

    /// Value handed to the selection callback when this row is clicked.
    pub fn selection(&self, select_error_rows: bool) -> Option<&str> {
        match self.kind {
            RowKind::Error if !select_error_rows => None,
            _ => Some(&self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Hidden,
    Loading,
    Rows(Vec<DisplayRow>),
}

impl Presentation {
    pub fn rows(&self) -> &[DisplayRow] {
        match self {
            Self::Rows(rows) => rows,
            Self::Hidden | Self::Loading => &[],
        }
    }
}

pub fn present(state: &SearchState, has_input: bool) -> Presentation {
    if !has_input {
        return Presentation::Hidden;
    }
    if state.loading {
        return Presentation::Loading;
    }
    Presentation::Rows(state.rows.iter().map(DisplayRow::from_row).collect())
}

pub fn class_name(kind: RowKind) -> &'static str {
    match kind {
        RowKind::Error => "item results-container__error",
        RowKind::NoResult => "item results-container__no-result",
        RowKind::Match => "item results-container__result",
    }
}
