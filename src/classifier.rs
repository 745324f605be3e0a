//! Page-by-page classification of ruled location tables.

use tracing::{debug, info, warn};

use crate::hierarchy::{Classification, HierarchyState};
use crate::layout::CropError;
use crate::model::{BBox, DetectedTable, PageLayout};
use crate::options::ClassifyOptions;
use crate::table_finder::find_tables;
use crate::typography::{CellIssue, FirstCell, analyse_first_cell, is_upper};
use crate::warning::{ExtractWarning, WarningCode};

const HEADER_ROW_TOKENS: [&str; 2] = ["REGION", "PROVINCE"];

/// Result of looking for a heading above a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSearch {
    Found(String),
    /// A candidate line exists but reads like body text.
    Rejected(String),
    Empty,
    Unresolved(CropError),
}

/// What happened to one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// A repeated column-header row; nothing is emitted.
    HeaderRow,
    Emitted(Classification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub page: u32,
    pub title: String,
    pub hierarchy: HierarchyState,
    /// Cleaned text of every cell after the first.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedPages {
    pub rows: Vec<ClassifiedRow>,
    pub table_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

#[must_use]
pub fn is_header_row(text: &str) -> bool {
    HEADER_ROW_TOKENS.iter().all(|token| text.contains(token))
}

/// Advances the hierarchy by one row.
#[must_use]
pub fn process_row(state: HierarchyState, first_cell: &FirstCell) -> (HierarchyState, RowOutcome) {
    if is_header_row(first_cell.text()) {
        return (state, RowOutcome::HeaderRow);
    }
    let (state, classification) = state.apply(first_cell);
    (state, RowOutcome::Emitted(classification))
}

/// Looks for the nearest text line in the band above `table_bbox`.
#[must_use]
pub fn search_title(page: &PageLayout, table_bbox: &BBox, options: &ClassifyOptions) -> TitleSearch {
    let band = BBox::new(
        0.0,
        (table_bbox.top - options.header_search_distance).max(0.0),
        page.width,
        table_bbox.top,
    );
    let region = match page.crop(band) {
        Ok(region) => region,
        Err(error) => return TitleSearch::Unresolved(error),
    };

    let Some(candidate) = region.text_lines().pop().map(|line| line.trim().to_string()) else {
        return TitleSearch::Empty;
    };

    if is_upper(&candidate) || candidate.chars().count() < options.title_max_chars {
        TitleSearch::Found(candidate)
    } else {
        TitleSearch::Rejected(candidate)
    }
}

fn cell_text(page: &PageLayout, cell: Option<&BBox>) -> String {
    cell.map(|bbox| page.within(*bbox).text().replace('\n', " ").trim().to_string())
        .unwrap_or_default()
}

/// Classifies every ruled table on `pages`, threading the hierarchy and title across pages.
#[must_use]
pub fn classify_tables(pages: &[PageLayout], options: &ClassifyOptions) -> ClassifiedPages {
    let mut output = ClassifiedPages::default();
    let mut state = HierarchyState::default();
    let mut title = options.initial_title.clone();

    for page in pages {
        let tables = find_tables(page, &options.table);
        if !tables.is_empty() {
            info!("page {}: found {} table(s)", page.page_number, tables.len());
        }

        for table in &tables {
            output.table_count += 1;
            let table_id = output.table_count;
            title = next_title(page, table, title, table_id, options, &mut output.warnings);
            state = classify_table(page, table, state, &title, table_id, options, &mut output);
        }
    }

    if output.table_count == 0 {
        output.warnings.push(ExtractWarning::new(
            WarningCode::NoTablesDetected,
            "no ruled tables were detected in the selected pages",
        ));
    }

    output
}

fn next_title(
    page: &PageLayout,
    table: &DetectedTable,
    current: String,
    table_id: usize,
    options: &ClassifyOptions,
    warnings: &mut Vec<ExtractWarning>,
) -> String {
    match search_title(page, &table.bbox, options) {
        TitleSearch::Found(title) => {
            debug!(page = page.page_number, table_id, %title, "section title");
            title
        }
        TitleSearch::Rejected(line) => {
            debug!(page = page.page_number, table_id, %line, "line above table is not a title");
            current
        }
        TitleSearch::Empty => current,
        TitleSearch::Unresolved(error) => {
            warn!(page = page.page_number, table_id, ?error, "title band could not be cropped");
            warnings.push(
                ExtractWarning::new(
                    WarningCode::TitleSearchUnresolved,
                    format!("title band above the table is not a valid region ({error:?}); previous title kept"),
                )
                .with_page(page.page_number)
                .with_table_id(table_id),
            );
            current
        }
    }
}

fn classify_table(
    page: &PageLayout,
    table: &DetectedTable,
    mut state: HierarchyState,
    title: &str,
    table_id: usize,
    options: &ClassifyOptions,
    output: &mut ClassifiedPages,
) -> HierarchyState {
    for (row_index, row) in table.rows.iter().enumerate() {
        let Some(first) = row.cells.first() else {
            continue;
        };

        let first_cell = analyse_first_cell(page, *first, options.alignment_tolerance);
        if let FirstCell::Unresolved(CellIssue::InvalidCrop(error)) = &first_cell {
            output.warnings.push(
                ExtractWarning::new(
                    WarningCode::InvalidCellCrop,
                    format!("first cell is not a valid region ({error:?}); treated as empty"),
                )
                .with_page(page.page_number)
                .with_table_id(table_id)
                .with_row(row_index),
            );
        }

        let (next, outcome) = process_row(state, &first_cell);
        state = next;
        match outcome {
            RowOutcome::HeaderRow => {
                debug!(page = page.page_number, table_id, row_index, "skipping header row");
                continue;
            }
            RowOutcome::Emitted(Classification::Unclassified) => {
                output.warnings.push(
                    ExtractWarning::new(
                        WarningCode::UnclassifiedLocation,
                        format!(
                            "'{}' matches no location rule; hierarchy unchanged",
                            first_cell.text()
                        ),
                    )
                    .with_page(page.page_number)
                    .with_table_id(table_id)
                    .with_row(row_index),
                );
            }
            RowOutcome::Emitted(classification) => {
                debug!(
                    page = page.page_number,
                    table_id,
                    row_index,
                    ?classification,
                    text = first_cell.text(),
                    "classified row"
                );
            }
        }

        output.rows.push(ClassifiedRow {
            page: page.page_number,
            title: title.to_string(),
            hierarchy: state.clone(),
            columns: row
                .cells
                .iter()
                .skip(1)
                .map(|cell| cell_text(page, cell.as_ref()))
                .collect(),
        });
    }

    state
}
