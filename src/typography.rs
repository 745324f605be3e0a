//! Alignment and casing of a table cell's text.

use serde::Serialize;

use crate::layout::CropError;
use crate::model::{BBox, PageLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Alignment {
    Center,
    Left,
    Right,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Casing {
    Upper,
    Title,
    Mixed,
}

/// Why a first cell produced no usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellIssue {
    /// The column position is covered by a neighbouring spanning cell.
    MissingCell,
    InvalidCrop(CropError),
    NoText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstCell {
    Resolved {
        text: String,
        alignment: Alignment,
        casing: Casing,
    },
    Unresolved(CellIssue),
}

impl FirstCell {
    /// Text of the cell, empty when unresolved.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Resolved { text, .. } => text,
            Self::Unresolved(_) => "",
        }
    }
}

/// Alignment of text spanning `text_x0..text_x1` inside `cell`.
#[must_use]
pub fn classify_alignment(cell: &BBox, text_x0: f64, text_x1: f64, tolerance: f64) -> Alignment {
    let left_margin = text_x0 - cell.x0;
    let right_margin = cell.x1 - text_x1;

    if (left_margin - right_margin).abs() < tolerance {
        Alignment::Center
    } else if left_margin < tolerance * 2.0 {
        Alignment::Left
    } else if right_margin < tolerance * 2.0 {
        Alignment::Right
    } else {
        Alignment::Unknown
    }
}

/// At least one cased letter and no lower-case ones.
#[must_use]
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        if ch.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Every run of cased letters starts upper-case and continues lower-case.
#[must_use]
pub fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for ch in text.chars() {
        if ch.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if ch.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

#[must_use]
pub fn classify_casing(text: &str) -> Casing {
    if is_upper(text) {
        Casing::Upper
    } else if is_title(text) {
        Casing::Title
    } else {
        Casing::Mixed
    }
}

/// Reads the words inside a table's first cell and classifies their typography.
#[must_use]
pub fn analyse_first_cell(page: &PageLayout, cell: Option<BBox>, tolerance: f64) -> FirstCell {
    let Some(cell) = cell else {
        return FirstCell::Unresolved(CellIssue::MissingCell);
    };
    let region = match page.crop(cell) {
        Ok(region) => region,
        Err(error) => return FirstCell::Unresolved(CellIssue::InvalidCrop(error)),
    };

    let words = region.words();
    let text = words
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if text.is_empty() {
        return FirstCell::Unresolved(CellIssue::NoText);
    }

    let text_x0 = words
        .iter()
        .map(|word| word.bbox.x0)
        .fold(f64::INFINITY, f64::min);
    let text_x1 = words
        .iter()
        .map(|word| word.bbox.x1)
        .fold(f64::NEG_INFINITY, f64::max);

    FirstCell::Resolved {
        alignment: classify_alignment(&cell, text_x0, text_x1, tolerance),
        casing: classify_casing(&text),
        text,
    }
}
