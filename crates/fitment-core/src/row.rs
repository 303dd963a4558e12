use csv::StringRecord;

use crate::error::{FitmentError, Result};
use crate::models::FilterCategory;

// Fixed 14-column layout of the source table (delimiter `;`):
// brand; base model; full model; power; engine code; production start;
// production end; fixed chassis note; comment; date note; air; cabin;
// diesel; oil.
pub const COLUMN_COUNT: usize = 14;

// Repeated header rows appear mid-file in the source export; they carry
// the column title in the brand field.
pub const HEADER_SENTINEL: &str = "Marque";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub brand: String,
    pub base_model: String,
    pub full_model: String,
    pub power: String,
    pub engine_code: String,
    pub production_start: String,
    pub production_end: String,
    pub chassis_note: String,
    pub comment: String,
    pub date_note: String,
    pub air_ref: String,
    pub cabin_ref: String,
    pub diesel_ref: String,
    pub oil_ref: String,
}

impl RawRow {
    pub fn from_record(record: &StringRecord) -> Result<Self> {
        if record.len() < COLUMN_COUNT {
            return Err(FitmentError::Validation(format!(
                "expected {COLUMN_COUNT} columns, got {}",
                record.len()
            )));
        }
        let field = |index: usize| record.get(index).unwrap_or_default().trim().to_string();
        Ok(Self {
            brand: field(0),
            base_model: field(1),
            full_model: field(2),
            power: field(3),
            engine_code: field(4),
            production_start: field(5),
            production_end: field(6),
            chassis_note: field(7),
            comment: field(8),
            date_note: field(9),
            air_ref: field(10),
            cabin_ref: field(11),
            diesel_ref: field(12),
            oil_ref: field(13),
        })
    }

    #[must_use]
    pub fn is_header(&self) -> bool {
        self.brand == HEADER_SENTINEL
    }

    #[must_use]
    pub fn category_reference(&self, category: FilterCategory) -> &str {
        match category {
            FilterCategory::Oil => &self.oil_ref,
            FilterCategory::Air => &self.air_ref,
            FilterCategory::Diesel => &self.diesel_ref,
            FilterCategory::Cabin => &self.cabin_ref,
        }
    }

    #[must_use]
    pub fn has_any_reference(&self) -> bool {
        FilterCategory::ALL
            .iter()
            .any(|&category| !self.category_reference(category).is_empty())
    }

    // Notes attached to every reference present on this row.
    #[must_use]
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.date_note.is_empty() {
            notes.push(format!("Date: {}", self.date_note));
        }
        if !self.comment.is_empty() {
            notes.push(self.comment.clone());
        }
        notes
    }

    #[must_use]
    pub fn vehicle_variant(&self) -> String {
        extract_variant(&self.base_model, &self.full_model)
    }
}

// Heuristic variant extraction: the trim string is whatever follows the
// base model designation inside the full model string. Lossy when the
// source spells the base model differently in the two columns; the
// fallback keeps the full string rather than guessing.
#[must_use]
pub fn extract_variant(base_model: &str, full_model: &str) -> String {
    let base = base_model.trim();
    let full = full_model.trim();
    if base.is_empty() || full.is_empty() {
        return String::new();
    }
    match full.find(base) {
        Some(start) => full[start + base.len()..]
            .trim_start_matches(|c: char| c.is_whitespace() || c == '/')
            .trim()
            .to_string(),
        None => full.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn decodes_all_fourteen_columns() {
        let row = RawRow::from_record(&record(&[
            "ABARTH",
            "500 II",
            "500 II / 595 / 695 1.4 Turbo 135",
            "135",
            "312A1000",
            "01/2008",
            "",
            "chassis 312",
            "check seal",
            "07/2012",
            "A1234",
            "C9876",
            "",
            "37-L330",
        ]))
        .expect("row");

        assert_eq!(row.brand, "ABARTH");
        assert_eq!(row.oil_ref, "37-L330");
        assert_eq!(row.air_ref, "A1234");
        assert_eq!(row.cabin_ref, "C9876");
        assert_eq!(row.diesel_ref, "");
        assert_eq!(
            row.notes(),
            vec!["Date: 07/2012".to_string(), "check seal".to_string()]
        );
        assert!(row.has_any_reference());
    }

    #[test]
    fn rejects_short_rows() {
        let err = RawRow::from_record(&record(&["ABARTH", "500 II"])).expect_err("short row");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn header_sentinel_is_detected() {
        let mut fields = vec!["Marque"; 1];
        fields.extend(std::iter::repeat_n("", COLUMN_COUNT - 1));
        let row = RawRow::from_record(&record(&fields)).expect("row");
        assert!(row.is_header());
    }

    #[test]
    fn variant_strips_leading_separators() {
        assert_eq!(
            extract_variant("500 II", "500 II / 595 / 695 1.4 Turbo 135"),
            "595 / 695 1.4 Turbo 135"
        );
    }

    #[test]
    fn variant_falls_back_to_full_model() {
        assert_eq!(extract_variant("GOLF", "POLO 1.2 TSI"), "POLO 1.2 TSI");
    }

    #[test]
    fn variant_is_empty_when_either_side_is_missing() {
        assert_eq!(extract_variant("", "500 II"), "");
        assert_eq!(extract_variant("500 II", ""), "");
    }
}
