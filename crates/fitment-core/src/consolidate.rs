use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{FitmentError, Result};
use crate::models::{
    CompositeKey, FilterCategory, FilterReference, FilterSet, FitmentRecord, RecordMetadata,
};
use crate::row::RawRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationStats {
    pub original_rows: usize,
    pub processed_rows: usize,
    pub error_rows: usize,
    pub consolidated_records: usize,
}

impl ConsolidationStats {
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        if self.original_rows == 0 {
            return 0.0;
        }
        (1.0 - self.consolidated_records as f64 / self.original_rows as f64) * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsolidationOutcome {
    pub records: Vec<FitmentRecord>,
    pub stats: ConsolidationStats,
}

// Streaming fold of raw rows into composite-keyed records. The first row
// for a key initializes the descriptive fields; later rows only merge
// filter references and metadata.
#[derive(Debug, Default)]
pub struct Consolidator {
    by_key: HashMap<CompositeKey, usize>,
    records: Vec<FitmentRecord>,
    stats: ConsolidationStats,
}

impl Consolidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_record(&mut self, record: &StringRecord) {
        self.stats.original_rows += 1;
        match RawRow::from_record(record) {
            Ok(row) => {
                if row.is_header() {
                    return;
                }
                self.push_row(row);
                self.stats.processed_rows += 1;
            }
            Err(_) => {
                self.stats.error_rows += 1;
            }
        }
    }

    pub fn note_unreadable_record(&mut self) {
        self.stats.original_rows += 1;
        self.stats.error_rows += 1;
    }

    fn push_row(&mut self, row: RawRow) {
        let key = CompositeKey {
            brand: row.brand.clone(),
            full_vehicle_model: row.full_model.clone(),
            engine_code: row.engine_code.clone(),
            power: row.power.clone(),
        };

        let index = match self.by_key.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.records.len();
                self.records.push(FitmentRecord {
                    brand: row.brand.clone(),
                    type_model: row.base_model.clone(),
                    full_vehicle_model: row.full_model.clone(),
                    vehicle_variant: row.vehicle_variant(),
                    engine_code: row.engine_code.clone(),
                    power: row.power.clone(),
                    production_start: row.production_start.clone(),
                    production_end: row.production_end.clone(),
                    filters: FilterSet::default(),
                    metadata: RecordMetadata::default(),
                });
                self.by_key.insert(key, index);
                index
            }
        };

        let record = &mut self.records[index];
        let notes = row.notes();
        for category in FilterCategory::ALL {
            let reference = row.category_reference(category);
            if !reference.is_empty() {
                add_filter_with_dedup(record.filters.get_mut(category), reference, &notes);
            }
        }

        // Latest chassis note wins; a free comment counts as a general
        // remark only on rows carrying no filter reference at all.
        if !row.chassis_note.is_empty() {
            record.metadata.chassis_note = Some(row.chassis_note.clone());
        }
        if !row.comment.is_empty() && !row.has_any_reference() {
            record.metadata.general_comment = Some(row.comment.clone());
        }
    }

    #[must_use]
    pub fn finish(mut self) -> ConsolidationOutcome {
        self.stats.consolidated_records = self.records.len();
        ConsolidationOutcome {
            records: self.records,
            stats: self.stats,
        }
    }
}

pub fn add_filter_with_dedup(list: &mut Vec<FilterReference>, reference: &str, notes: &[String]) {
    if let Some(existing) = list.iter_mut().find(|entry| entry.reference == reference) {
        for note in notes {
            if !note.is_empty() && !existing.notes.contains(note) {
                existing.notes.push(note.clone());
            }
        }
        return;
    }
    list.push(FilterReference {
        reference: reference.to_string(),
        notes: notes.iter().filter(|note| !note.is_empty()).cloned().collect(),
    });
}

pub fn consolidate_reader<R: Read>(input: R) -> Result<ConsolidationOutcome> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let mut consolidator = Consolidator::new();
    for record in reader.records() {
        match record {
            Ok(record) => consolidator.push_record(&record),
            // Row-level decode problems are tolerated; a broken source
            // stream is an infrastructure failure and aborts the batch.
            Err(err) if err.is_io_error() => return Err(FitmentError::Csv(err)),
            Err(_) => consolidator.note_unreadable_record(),
        }
    }
    Ok(consolidator.finish())
}

pub fn consolidate_path(path: impl AsRef<Path>) -> Result<ConsolidationOutcome> {
    consolidate_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consolidate(raw: &str) -> ConsolidationOutcome {
        consolidate_reader(raw.as_bytes()).expect("consolidate")
    }

    const HEADER: &str =
        "Marque;Type modele;Modele;Puissance;Moteur;Debut;Fin;Com fixe;Commentaire;Date;Air;Habitacle;Gazole;Huile";

    #[test]
    fn rows_sharing_a_key_collapse_into_one_record() {
        let outcome = consolidate(&format!(
            "{HEADER}\n\
             ABARTH;500 II;500 II 1.4;135;312A1000;01/2008;;;;;A1;;;37-L330\n\
             ABARTH;500 II;500 II 1.4;135;312A1000;01/2008;;;;;;C7;;37-L330\n"
        ));

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.filters.oil.len(), 1);
        assert_eq!(record.filters.air.len(), 1);
        assert_eq!(record.filters.cabin.len(), 1);
        assert_eq!(outcome.stats.original_rows, 3);
        assert_eq!(outcome.stats.processed_rows, 2);
        assert_eq!(outcome.stats.consolidated_records, 1);
    }

    #[test]
    fn first_row_wins_for_descriptive_fields() {
        let outcome = consolidate(
            "A;M1;M1 1.4;100;ENG;01/2000;12/2005;;;;;;;X-1\n\
             A;M2;M1 1.4;100;ENG;02/2001;12/2009;;;;;;;X-2\n",
        );

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.type_model, "M1");
        assert_eq!(record.production_start, "01/2000");
        assert_eq!(record.filters.oil.len(), 2);
    }

    #[test]
    fn duplicate_reference_unions_notes_in_order() {
        let outcome = consolidate(
            "A;M;M 1.4;100;ENG;;;;first note;01/2010;;;;X-1\n\
             A;M;M 1.4;100;ENG;;;;second note;01/2010;;;;X-1\n\
             A;M;M 1.4;100;ENG;;;;first note;;;;;X-1\n",
        );

        let oil = &outcome.records[0].filters.oil;
        assert_eq!(oil.len(), 1);
        assert_eq!(
            oil[0].notes,
            vec![
                "Date: 01/2010".to_string(),
                "first note".to_string(),
                "second note".to_string(),
            ]
        );
    }

    #[test]
    fn comment_only_rows_become_general_comments() {
        let outcome = consolidate(
            "A;M;M 1.4;100;ENG;;;;applies from chassis 400;;;;;\n\
             A;M;M 1.4;100;ENG;;;chassis 312;oil note;;;;;X-1\n",
        );

        let record = &outcome.records[0];
        assert_eq!(
            record.metadata.general_comment.as_deref(),
            Some("applies from chassis 400")
        );
        assert_eq!(record.metadata.chassis_note.as_deref(), Some("chassis 312"));
        assert_eq!(record.filters.oil[0].notes, vec!["oil note".to_string()]);
    }

    #[test]
    fn malformed_rows_are_counted_and_skipped() {
        let outcome = consolidate(
            "A;M;M 1.4;100;ENG;;;;;;;;;X-1\n\
             broken;row\n\
             A;M;M 2.0;120;ENG2;;;;;;;;;X-2\n",
        );

        assert_eq!(outcome.stats.error_rows, 1);
        assert_eq!(outcome.stats.processed_rows, 2);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn consolidation_is_idempotent() {
        let raw = "A;M;M 1.4;100;ENG;;;;note;01/2010;A9;;;X-1\n\
                   A;M;M 1.4;100;ENG;;;;note;01/2010;A9;;;X-1\n\
                   B;N;N 2.0;150;ENG2;;;;;;;;G5;\n";

        let first = consolidate(raw);
        let second = consolidate(raw);
        assert_eq!(first.records, second.records);
        assert_eq!(first.stats, second.stats);
    }

    #[test]
    fn no_duplicate_reference_within_a_category() {
        let outcome = consolidate(
            "A;M;M 1.4;100;ENG;;;;;;A9;A9;;\n\
             A;M;M 1.4;100;ENG;;;;;;A9;;;\n",
        );

        for record in &outcome.records {
            for category in FilterCategory::ALL {
                let refs = record.filters.get(category);
                for (i, entry) in refs.iter().enumerate() {
                    assert!(
                        refs.iter()
                            .skip(i + 1)
                            .all(|other| other.reference != entry.reference),
                        "duplicate reference in {category}"
                    );
                }
            }
        }
    }
}
