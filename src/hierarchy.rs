//! Location hierarchy carried from row to row while a report is classified.

use serde::Serialize;

use crate::typography::{Alignment, Casing, FirstCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Region,
    Province,
    Municipality,
    Barangay,
}

/// What a row's first cell did to the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Assigned(Level),
    /// No text in the first cell: the row inherits the current state.
    FillDown,
    /// Text present but no rule matched its typography.
    Unclassified,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyState {
    pub region: Option<String>,
    pub province: Option<String>,
    pub municipality: Option<String>,
    pub barangay: Option<String>,
}

impl HierarchyState {
    /// Classifies `first_cell` and returns the resulting state.
    ///
    /// Rules are tried in order and the first match wins:
    /// centred upper-case text is a region, left-aligned upper-case text a
    /// province, other centred text a municipality and right-aligned text a
    /// barangay. Setting a level clears every level below it.
    #[must_use]
    pub fn apply(self, first_cell: &FirstCell) -> (Self, Classification) {
        let FirstCell::Resolved {
            text,
            alignment,
            casing,
        } = first_cell
        else {
            return (self, Classification::FillDown);
        };

        let upper = *casing == Casing::Upper;
        let level = match alignment {
            Alignment::Center if upper => Level::Region,
            Alignment::Left if upper => Level::Province,
            Alignment::Center => Level::Municipality,
            Alignment::Right => Level::Barangay,
            _ => return (self, Classification::Unclassified),
        };

        (self.assign(level, text.clone()), Classification::Assigned(level))
    }

    #[must_use]
    pub fn assign(self, level: Level, value: String) -> Self {
        match level {
            Level::Region => Self {
                region: Some(value),
                ..Self::default()
            },
            Level::Province => Self {
                region: self.region,
                province: Some(value),
                ..Self::default()
            },
            Level::Municipality => Self {
                municipality: Some(value),
                barangay: None,
                ..self
            },
            Level::Barangay => Self {
                barangay: Some(value),
                ..self
            },
        }
    }

    /// Slots in output order, unset ones as empty strings.
    #[must_use]
    pub fn columns(&self) -> [&str; 4] {
        [
            self.region.as_deref().unwrap_or_default(),
            self.province.as_deref().unwrap_or_default(),
            self.municipality.as_deref().unwrap_or_default(),
            self.barangay.as_deref().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{Classification, HierarchyState, Level};
    use crate::layout::CropError;
    use crate::typography::{Alignment, Casing, CellIssue, FirstCell};

    fn cell(text: &str, alignment: Alignment, casing: Casing) -> FirstCell {
        FirstCell::Resolved {
            text: text.to_string(),
            alignment,
            casing,
        }
    }

    fn full_state() -> HierarchyState {
        HierarchyState {
            region: Some("NCR".to_string()),
            province: Some("METRO MANILA".to_string()),
            municipality: Some("Quezon City".to_string()),
            barangay: Some("Barangay A".to_string()),
        }
    }

    #[test]
    fn new_region_clears_every_lower_level() {
        let (state, classification) =
            full_state().apply(&cell("REGION III", Alignment::Center, Casing::Upper));
        assert_eq!(classification, Classification::Assigned(Level::Region));
        assert_eq!(state.columns(), ["REGION III", "", "", ""]);
    }

    #[test]
    fn new_province_keeps_region() {
        let (state, classification) =
            full_state().apply(&cell("BULACAN", Alignment::Left, Casing::Upper));
        assert_eq!(classification, Classification::Assigned(Level::Province));
        assert_eq!(state.columns(), ["NCR", "BULACAN", "", ""]);
    }

    #[test]
    fn new_municipality_clears_only_barangay() {
        let (state, _) = full_state().apply(&cell("Pasig City", Alignment::Center, Casing::Title));
        assert_eq!(state.columns(), ["NCR", "METRO MANILA", "Pasig City", ""]);
    }

    #[test]
    fn barangay_clears_nothing() {
        let (state, classification) =
            full_state().apply(&cell("Barangay B", Alignment::Right, Casing::Title));
        assert_eq!(classification, Classification::Assigned(Level::Barangay));
        assert_eq!(
            state.columns(),
            ["NCR", "METRO MANILA", "Quezon City", "Barangay B"]
        );
    }

    #[test]
    fn right_aligned_upper_case_is_still_a_barangay() {
        let (_, classification) =
            HierarchyState::default().apply(&cell("POBLACION", Alignment::Right, Casing::Upper));
        assert_eq!(classification, Classification::Assigned(Level::Barangay));
    }

    #[test]
    fn unresolved_first_cell_fills_down() {
        for issue in [
            CellIssue::MissingCell,
            CellIssue::NoText,
            CellIssue::InvalidCrop(CropError::OutsidePage),
        ] {
            let (state, classification) = full_state().apply(&FirstCell::Unresolved(issue));
            assert_eq!(classification, Classification::FillDown);
            assert_eq!(state, full_state());
        }
    }

    #[test]
    fn unmatched_typography_leaves_state_untouched() {
        let cases = [
            cell("Subtotal", Alignment::Left, Casing::Title),
            cell("see note", Alignment::Left, Casing::Mixed),
            cell("TOTAL", Alignment::Unknown, Casing::Upper),
        ];
        for case in &cases {
            let (state, classification) = full_state().apply(case);
            assert_eq!(classification, Classification::Unclassified);
            assert_eq!(state, full_state());
        }
    }

    #[test]
    fn region_to_barangay_progression() {
        let rows = [
            cell("NCR", Alignment::Center, Casing::Upper),
            cell("Metro Manila", Alignment::Left, Casing::Upper),
            cell("Quezon City", Alignment::Center, Casing::Title),
            cell("Barangay A", Alignment::Right, Casing::Mixed),
        ];

        let mut state = HierarchyState::default();
        let mut progression = Vec::new();
        for row in &rows {
            (state, _) = state.apply(row);
            progression.push(state.columns().map(str::to_string));
        }

        assert_eq!(
            progression,
            vec![
                ["NCR", "", "", ""].map(str::to_string),
                ["NCR", "Metro Manila", "", ""].map(str::to_string),
                ["NCR", "Metro Manila", "Quezon City", ""].map(str::to_string),
                ["NCR", "Metro Manila", "Quezon City", "Barangay A"].map(str::to_string),
            ]
        );
    }
}
