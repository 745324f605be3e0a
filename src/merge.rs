use crate::classifier::ClassifiedRow;
use crate::model::MergedOutput;

pub(crate) const LOCATION_HEADERS: [&str; 6] = [
    "Page_Num",
    "Detected_Title",
    "Region",
    "Province",
    "City_Municipality",
    "Barangay",
];

/// True when at least one payload column carries text.
pub(crate) fn has_payload(row: &ClassifiedRow) -> bool {
    row.columns.iter().any(|column| !column.trim().is_empty())
}

/// Joins classified rows into one padded table, dropping rows without payload.
///
/// The column count is the widest row seen, counted before the drop.
pub(crate) fn merge_rows(rows: &[ClassifiedRow], table_count: usize) -> MergedOutput {
    let width = rows.iter().map(|row| row.columns.len()).max().unwrap_or(0);

    let mut headers = LOCATION_HEADERS.map(str::to_string).to_vec();
    headers.extend((1..=width).map(|index| format!("Column_{index}")));

    let rows = rows
        .iter()
        .filter(|row| has_payload(row))
        .map(|row| {
            let mut record = Vec::with_capacity(LOCATION_HEADERS.len() + width);
            record.push(row.page.to_string());
            record.push(row.title.clone());
            record.extend(row.hierarchy.columns().map(str::to_string));
            record.extend(row.columns.iter().cloned());
            record.resize(LOCATION_HEADERS.len() + width, String::new());
            record
        })
        .collect::<Vec<_>>();

    MergedOutput {
        headers,
        row_count: rows.len(),
        table_count,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::merge_rows;
    use crate::classifier::ClassifiedRow;
    use crate::hierarchy::HierarchyState;

    fn row(columns: &[&str]) -> ClassifiedRow {
        ClassifiedRow {
            page: 3,
            title: "AFFECTED POPULATION".to_string(),
            hierarchy: HierarchyState {
                region: Some("NCR".to_string()),
                ..HierarchyState::default()
            },
            columns: columns.iter().map(|column| (*column).to_string()).collect(),
        }
    }

    #[test]
    fn pads_rows_to_widest_table() {
        let merged = merge_rows(&[row(&["1", "2", "3"]), row(&["4"])], 2);
        assert_eq!(
            merged.headers,
            vec![
                "Page_Num",
                "Detected_Title",
                "Region",
                "Province",
                "City_Municipality",
                "Barangay",
                "Column_1",
                "Column_2",
                "Column_3"
            ]
        );
        assert_eq!(
            merged.rows[1],
            vec!["3", "AFFECTED POPULATION", "NCR", "", "", "", "4", "", ""]
        );
        assert_eq!(merged.table_count, 2);
    }

    #[test]
    fn drops_rows_without_payload() {
        let merged = merge_rows(&[row(&["", " "]), row(&[]), row(&["", "7"])], 1);
        assert_eq!(merged.row_count, 1);
        assert_eq!(merged.rows[0][7], "7");
        assert_eq!(merged.headers.len(), 8);
    }
}
