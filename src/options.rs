use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ExtractError;

/// Distance at which nearly-parallel rules collapse onto one grid line.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 5.0;
pub const DEFAULT_JOIN_TOLERANCE: f64 = 3.0;
pub const DEFAULT_EDGE_MIN_LENGTH: f64 = 3.0;
pub const DEFAULT_INTERSECTION_TOLERANCE: f64 = 3.0;
/// How far above a table the title search looks.
pub const DEFAULT_HEADER_SEARCH_DISTANCE: f64 = 80.0;
/// Margin difference below which first-cell text counts as centred.
pub const DEFAULT_ALIGNMENT_TOLERANCE: f64 = 5.0;
/// Lines at or above this length are only accepted as titles when fully upper-case.
pub const DEFAULT_TITLE_MAX_CHARS: usize = 100;
pub const DEFAULT_SECTION_TITLE: &str = "Unknown_Section";

pub const DEFAULT_HEADER_START_ROW: usize = 3;
pub const DEFAULT_HEADER_DEPTH: usize = 4;
pub const DEFAULT_MAX_DATA_ROWS: usize = 50;

/// 1-based page ranges, kept as ranges so wide selections stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    ranges: Vec<RangeInclusive<u32>>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(&page))
    }
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(selection: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for token in selection.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range start: '{start}'"))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid page range end: '{end}'"))?;
                if start == 0 || end == 0 {
                    return Err("pages are 1-based".to_string());
                }
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                ranges.push(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| format!("invalid page number: '{token}'"))?;
                if page == 0 {
                    return Err("pages are 1-based".to_string());
                }
                ranges.push(page..=page);
            }
        }

        if ranges.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { ranges })
    }
}

/// Grid detection settings for the line-based table finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSettings {
    pub snap_tolerance: f64,
    pub join_tolerance: f64,
    pub edge_min_length: f64,
    pub intersection_tolerance: f64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            join_tolerance: DEFAULT_JOIN_TOLERANCE,
            edge_min_length: DEFAULT_EDGE_MIN_LENGTH,
            intersection_tolerance: DEFAULT_INTERSECTION_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    pub pages: Option<PageSelection>,
    pub delimiter: u8,
    pub table: TableSettings,
    pub header_search_distance: f64,
    pub alignment_tolerance: f64,
    pub title_max_chars: usize,
    pub initial_title: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            pages: None,
            delimiter: b',',
            table: TableSettings::default(),
            header_search_distance: DEFAULT_HEADER_SEARCH_DISTANCE,
            alignment_tolerance: DEFAULT_ALIGNMENT_TOLERANCE,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            initial_title: DEFAULT_SECTION_TITLE.to_string(),
        }
    }
}

impl ClassifyOptions {
    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        let distances = [
            ("snap_tolerance", self.table.snap_tolerance),
            ("join_tolerance", self.table.join_tolerance),
            ("edge_min_length", self.table.edge_min_length),
            ("intersection_tolerance", self.table.intersection_tolerance),
            ("header_search_distance", self.header_search_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ExtractError::InvalidOption(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.alignment_tolerance.is_finite() || self.alignment_tolerance <= 0.0 {
            return Err(ExtractError::InvalidOption(format!(
                "alignment_tolerance must be positive, got {}",
                self.alignment_tolerance
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Worksheet name; the first sheet when unset.
    pub sheet: Option<String>,
    /// Absolute index of the first header row.
    pub header_start: usize,
    /// Number of contiguous header rows (tiers).
    pub header_depth: usize,
    /// Cap on data rows read after the header block.
    pub max_rows: usize,
    pub delimiter: u8,
    /// Emit blank columns for mapping keys the sheet lacks instead of failing.
    pub allow_missing: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            header_start: DEFAULT_HEADER_START_ROW,
            header_depth: DEFAULT_HEADER_DEPTH,
            max_rows: DEFAULT_MAX_DATA_ROWS,
            delimiter: b',',
            allow_missing: false,
        }
    }
}

impl FlattenOptions {
    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        if self.header_depth == 0 {
            return Err(ExtractError::InvalidOption(
                "header_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
