use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] pdf_extract::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no pages available after applying selection")]
    NoPagesSelected,

    #[error("worksheet '{0}' not found")]
    SheetNotFound(String),

    #[error("header rows {start}-{end} exceed the sheet height of {height} rows")]
    HeaderOutOfRange {
        start: usize,
        end: usize,
        height: usize,
    },

    #[error("mapped column '{0}' is missing from the flattened header")]
    MissingColumn(String),
}
