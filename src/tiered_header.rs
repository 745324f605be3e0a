//! Flattening of multi-row spreadsheet headers into single column names.

const TIER_SEPARATOR: &str = "_";

/// Tiers that end a column name: blank cells, `nan` and `Unnamed…` placeholders.
#[must_use]
pub fn is_placeholder_tier(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == "nan" || value.to_lowercase().starts_with("unnamed")
}

/// Forward-fills labels of merged header cells across the header block.
///
/// A merged cell keeps its text only in its left-most column. Each row is filled
/// left to right, but a blank never inherits across a column where any row above
/// already started a label of its own. The first column is never filled.
pub fn fill_merged_headers(rows: &mut [Vec<String>]) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut open = vec![true; width];

    for row in rows.iter_mut() {
        row.resize(width, String::new());
        let Some(first) = row.first() else {
            continue;
        };
        let mut last = first.clone();

        for (cell, is_open) in row.iter_mut().zip(open.iter_mut()).skip(1) {
            if !*is_open {
                last.clone_from(cell);
            }
            if cell.trim().is_empty() {
                cell.clone_from(&last);
            } else {
                *is_open = false;
                last.clone_from(cell);
            }
        }
    }
}

/// Joins tiers top-down, stopping at the first placeholder.
#[must_use]
pub fn flatten_tiers<'a>(tiers: impl IntoIterator<Item = &'a str>) -> String {
    tiers
        .into_iter()
        .map(str::trim)
        .take_while(|tier| !is_placeholder_tier(tier))
        .collect::<Vec<_>>()
        .join(TIER_SEPARATOR)
}

/// Flattened name of every column of a header block (one inner `Vec` per tier row).
#[must_use]
pub fn flatten_header(rows: &[Vec<String>]) -> Vec<String> {
    let mut rows = rows.to_vec();
    fill_merged_headers(&mut rows);

    let width = rows.first().map_or(0, Vec::len);
    (0..width)
        .map(|column| flatten_tiers(rows.iter().map(|row| row[column].as_str())))
        .collect()
}
