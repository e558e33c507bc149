use serde::{Deserialize, Serialize};

use crate::presentation::{DisplayRow, Presentation};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Hidden,
    Loading,
    Rows,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowDto {
    pub id: i64,
    pub value: String,
    pub class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewDto {
    pub state: ViewState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<RowDto>,
}

impl From<&DisplayRow> for RowDto {
    fn from(value: &DisplayRow) -> Self {
        Self {
            id: value.key,
            value: value.text.clone(),
            class: value.class_name().to_string(),
        }
    }
}

impl From<&Presentation> for ViewDto {
    fn from(value: &Presentation) -> Self {
        match value {
            Presentation::Hidden => Self {
                state: ViewState::Hidden,
                rows: Vec::new(),
            },
            Presentation::Loading => Self {
                state: ViewState::Loading,
                rows: Vec::new(),
            },
            Presentation::Rows(rows) => Self {
                state: ViewState::Rows,
                rows: rows.iter().map(RowDto::from).collect(),
            },
        }
    }
}

pub fn render_json(view: &Presentation) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ViewDto::from(view))
}
