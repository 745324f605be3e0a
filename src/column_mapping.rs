//! Flattened archive headers and the short keys they are published under.

/// Flattened header label to output key, in output column order.
pub const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("Main Event Disaster Type", "hasType"),
    ("Disaster Name", "eventName"),
    ("Date/Period", "startDate"),
    ("Latitude", "latitude"),
    ("Longitude", "longitude"),
    ("Main Area/s Affected / Location", "hasLocation"),
    (
        "Additional Perils/Disaster Sub-Type Occurences (Compound Disaster, e.g. Typhoon Haiyan = rain + wind + storm surge)",
        "hasSubtype",
    ),
    (
        "PREPAREDNESS_Announcements_Warnings Released / Status Alert or Alert/ State of Calamity",
        "declarationOfCalamity",
    ),
    (
        "PREPAREDNESS_Evacuation_No. of Evacuation Centers",
        "evacuationCenters",
    ),
    (
        "IMPACT_Number of Affected Areas_Barangays",
        "affectedBarangays",
    ),
    ("IMPACT_Casualties_Dead_Total", "dead"),
    ("IMPACT_Casualties_Injured_Total", "injured"),
    ("IMPACT_Casualties_Missing_Total", "missing"),
    ("IMPACT_Affected_Families", "affectedFamilies"),
    ("IMPACT_Affected_Persons", "affectedPersons"),
    ("IMPACT_Evacuated_Families", "displacedFamilies"),
    ("IMPACT_Evacuated_Persons", "displacedPersons"),
    (
        "IMPACT_Damages to Properties_Houses_Fully",
        "totallyDamagedHouses",
    ),
    (
        "IMPACT_Damages to Properties_Houses_Partially",
        "partiallyDamagedHouses",
    ),
    (
        "IMPACT_Damages to Properties_Infrastructure (in Millions)",
        "infraDamageAmount",
    ),
    (
        "IMPACT_Damages to Properties_Agriculture (in Millions)",
        "agricultureDamageAmount",
    ),
    (
        "IMPACT_Damages to Properties_Private/Commercial (in Millions)",
        "commercialDamageAmount",
    ),
    (
        "IMPACT_Status of Lifelines_Electricity or Power Supply",
        "powerAffected",
    ),
    (
        "IMPACT_Status of Lifelines_Communication Lines",
        "communicationAffected",
    ),
    (
        "IMPACT_Status of Lifelines_Transportation_Roads and Bridges",
        "roadAndBridgesAffected",
    ),
    (
        "IMPACT_Status of Lifelines_Transportation_Seaports",
        "seaportsAffected",
    ),
    (
        "IMPACT_Status of Lifelines_Transportation_Airports",
        "airportsAffected",
    ),
    (
        "IMPACT_Status of Lifelines_Water_Dams and other Reservoirs",
        "areDamsAffected",
    ),
    ("IMPACT_Status of Lifelines_Water_Tap", "isTapAffected"),
    (
        "RESPONSE AND RECOVERY_Allocated Funds for the Affected Area/s",
        "allocatedFunds",
    ),
    (
        "RESPONSE AND RECOVERY_NGO-LGU Support Units Present",
        "agencyLGUsPresent",
    ),
    (
        "RESPONSE AND RECOVERY_International Organizations Present",
        "internationalOrgsPresent",
    ),
    (
        "RESPONSE AND RECOVERY_Amount of Donation from International Organizations (including local NGOs)",
        "amoungNGOs",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Canned Goods, Rice, etc._Cost",
        "itemCostGoods",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Canned Goods, Rice, etc._Quantity",
        "itemQtyGoods",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Water_Cost",
        "itemCostWater",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Water_Quantity",
        "itemQtyWater",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Clothing_Cost",
        "itemCostClothing",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Clothing_Quantity",
        "itemQtyClothing",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Medicine_Cost",
        "itemCostMedicine",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Medicine_Quantity",
        "itemQtyMedicine",
    ),
    (
        "RESPONSE AND RECOVERY_Supply of Relief Goods_Items Not Specified (Cost)",
        "itemCostOthers",
    ),
    (
        "REFERENCES (Authors. Year. Title. Journal/Book/Newspaper. Publisher, Place published. Pages. Website, Date Accessed)",
        "reference",
    ),
    (
        "Detailed Description of Disaster Event",
        "OTHER [magnitude, remarks]",
    ),
];

/// One output column and where it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedColumn {
    pub label: &'static str,
    pub key: &'static str,
    /// Index of the left-most flattened column carrying `label`, if any.
    pub source: Option<usize>,
}

/// Resolves every mapping entry against the flattened header, in mapping order.
#[must_use]
pub fn resolve_columns(flattened: &[String]) -> Vec<MappedColumn> {
    COLUMN_MAPPING
        .iter()
        .map(|&(label, key)| MappedColumn {
            label,
            key,
            source: flattened.iter().position(|name| name == label),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{COLUMN_MAPPING, resolve_columns};
    use std::collections::HashSet;

    #[test]
    fn mapping_keys_and_values_are_unique() {
        assert_eq!(COLUMN_MAPPING.len(), 44);
        let labels = COLUMN_MAPPING
            .iter()
            .map(|(label, _)| *label)
            .collect::<HashSet<_>>();
        let keys = COLUMN_MAPPING
            .iter()
            .map(|(_, key)| *key)
            .collect::<HashSet<_>>();
        assert_eq!(labels.len(), COLUMN_MAPPING.len());
        assert_eq!(keys.len(), COLUMN_MAPPING.len());
    }

    #[test]
    fn resolves_in_mapping_order_with_left_most_source() {
        let flattened = vec![
            "IMPACT_Casualties_Dead_Total".to_string(),
            "Unmapped".to_string(),
            "Disaster Name".to_string(),
            "Disaster Name".to_string(),
        ];
        let columns = resolve_columns(&flattened);

        assert_eq!(columns.len(), COLUMN_MAPPING.len());
        assert_eq!(columns[0].key, "hasType");
        assert_eq!(columns[0].source, None);
        assert_eq!(columns[1].key, "eventName");
        assert_eq!(columns[1].source, Some(2));
        assert_eq!(columns[10].key, "dead");
        assert_eq!(columns[10].source, Some(0));
    }
}
