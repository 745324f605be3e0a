pub mod classifier;
pub mod column_mapping;
mod csv_out;
pub mod error;
pub mod hierarchy;
pub mod layout;
mod merge;
pub mod model;
pub mod options;
mod pdf_reader;
mod table_finder;
pub mod tiered_header;
pub mod typography;
pub mod warning;
mod workbook;

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::classify_tables;
use crate::column_mapping::resolve_columns;
use crate::csv_out::{write_csv, write_csv_to_string};
use crate::merge::{has_payload, merge_rows};
use crate::pdf_reader::{read_pdf_layouts, read_pdf_layouts_from_bytes};
use crate::tiered_header::flatten_header;
use crate::workbook::read_sheet_grid;

pub use error::ExtractError;
pub use hierarchy::{Classification, HierarchyState, Level};
pub use model::{MergedOutput, PageLayout};
pub use options::{ClassifyOptions, FlattenOptions, PageSelection, TableSettings};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};
pub use workbook::SheetGrid;

/// Rows of hierarchy kept in the classification report for a quick look.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub page_count: usize,
    pub table_count: usize,
    pub row_count: usize,
    /// Rows dropped because every payload column was blank.
    pub dropped_row_count: usize,
    pub warnings: Vec<ExtractWarning>,
    pub preview: Vec<HierarchyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlattenReport {
    pub column_count: usize,
    pub row_count: usize,
    pub dropped_row_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

/// Classifies already parsed pages into the hierarchical output table.
pub fn classify_pages(
    pages: &[PageLayout],
    options: &ClassifyOptions,
) -> Result<(MergedOutput, ClassificationReport), ExtractError> {
    options.validate()?;

    let classified = classify_tables(pages, options);
    let merged = merge_rows(&classified.rows, classified.table_count);
    let preview = classified
        .rows
        .iter()
        .filter(|row| has_payload(row))
        .take(PREVIEW_ROWS)
        .map(|row| row.hierarchy.clone())
        .collect();

    let report = ClassificationReport {
        page_count: pages.len(),
        table_count: merged.table_count,
        row_count: merged.row_count,
        dropped_row_count: classified.rows.len() - merged.row_count,
        warnings: classified.warnings,
        preview,
    };
    info!(
        "classified {} row(s) from {} table(s) on {} page(s)",
        report.row_count, report.table_count, report.page_count
    );

    Ok((merged, report))
}

pub fn classify_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ClassifyOptions,
) -> Result<ClassificationReport, ExtractError> {
    options.validate()?;

    let pages = read_pdf_layouts(input_pdf, options.pages.as_ref())?;
    let (merged, report) = classify_pages(&pages, options)?;
    write_csv(output_csv, &merged, options.delimiter)?;

    Ok(report)
}

pub fn classify_pdf_bytes_to_csv_string(
    input_pdf: &[u8],
    options: &ClassifyOptions,
) -> Result<(String, ClassificationReport), ExtractError> {
    options.validate()?;

    let pages = read_pdf_layouts_from_bytes(input_pdf, options.pages.as_ref())?;
    let (merged, report) = classify_pages(&pages, options)?;
    let csv = write_csv_to_string(&merged, options.delimiter)?;

    Ok((csv, report))
}

/// Flattens the header block of `grid` and projects its data rows through the column mapping.
///
/// Cell text is taken as rendered by the workbook reader, so integral floats are written
/// without a fraction (`12`, not the `12.0` a float-typed dataframe export would print).
pub fn flatten_grid(
    grid: &SheetGrid,
    options: &FlattenOptions,
) -> Result<(MergedOutput, FlattenReport), ExtractError> {
    options.validate()?;

    let header_end = options.header_start.saturating_add(options.header_depth);
    if header_end > grid.height() {
        return Err(ExtractError::HeaderOutOfRange {
            start: options.header_start,
            end: header_end - 1,
            height: grid.height(),
        });
    }

    let header_rows = (options.header_start..header_end)
        .map(|row| grid.row(row))
        .collect::<Vec<_>>();
    let columns = resolve_columns(&flatten_header(&header_rows));

    let mut warnings = Vec::new();
    for column in columns.iter().filter(|column| column.source.is_none()) {
        if !options.allow_missing {
            return Err(ExtractError::MissingColumn(column.label.to_string()));
        }
        warn!(label = column.label, "mapped column missing; emitting it blank");
        warnings.push(ExtractWarning::new(
            ExtractWarningCode::MissingMappedColumn,
            format!("'{}' is not in the sheet header; '{}' left blank", column.label, column.key),
        ));
    }

    let mut headers = vec![String::new()];
    headers.extend(columns.iter().map(|column| column.key.to_string()));

    let data_end = header_end.saturating_add(options.max_rows).min(grid.height());
    let mut rows = Vec::new();
    let mut dropped_row_count = 0;
    for (index, row) in (header_end..data_end).enumerate() {
        let values = columns
            .iter()
            .map(|column| {
                column
                    .source
                    .map_or_else(String::new, |source| grid.cell(row, source).to_string())
            })
            .collect::<Vec<_>>();
        if values.iter().all(|value| value.trim().is_empty()) {
            dropped_row_count += 1;
            continue;
        }

        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(index.to_string());
        record.extend(values);
        rows.push(record);
    }

    let merged = MergedOutput {
        headers,
        row_count: rows.len(),
        table_count: 1,
        rows,
    };
    let report = FlattenReport {
        column_count: columns.len(),
        row_count: merged.row_count,
        dropped_row_count,
        warnings,
    };
    info!(
        "flattened {} column(s), kept {} row(s)",
        report.column_count, report.row_count
    );

    Ok((merged, report))
}

pub fn flatten_workbook_to_csv(
    input: &Path,
    output_csv: &Path,
    options: &FlattenOptions,
) -> Result<FlattenReport, ExtractError> {
    options.validate()?;

    let grid = read_sheet_grid(input, options.sheet.as_deref())?;
    let (merged, report) = flatten_grid(&grid, options)?;
    write_csv(output_csv, &merged, options.delimiter)?;

    Ok(report)
}
