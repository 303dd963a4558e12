use crate::error::Result;
use crate::models::{FitmentRecord, VariantSummary};

// Typed read seam between the consolidated dataset and the resolution
// engine. Implementations are read-only at query time.
pub trait FitmentStore {
    // Exact brand + base model; distinct variants, first record wins for
    // the engine/power shown, sorted by variant ascending.
    fn find_variants(&self, brand: &str, model: &str) -> Result<Vec<VariantSummary>>;

    // Exact brand; substring containment on full model and engine code.
    // The source data's model/engine fields are unnormalized, so substring
    // matching is the documented discipline, not equality.
    fn find_by_vehicle(&self, brand: &str, model: &str, engine: &str)
    -> Result<Vec<FitmentRecord>>;

    // Exact brand + base model, used by bulk product lookup.
    fn find_by_model(&self, brand: &str, model: &str) -> Result<Vec<FitmentRecord>>;
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

pub(crate) fn matches_vehicle(
    record: &FitmentRecord,
    brand: &str,
    model: &str,
    engine: &str,
) -> bool {
    record.brand == brand
        && contains_ci(&record.full_vehicle_model, model)
        && contains_ci(&record.engine_code, engine)
}

pub(crate) fn matches_model(record: &FitmentRecord, brand: &str, model: &str) -> bool {
    record.brand == brand && record.type_model == model
}

pub(crate) fn variant_summaries<'a>(
    records: impl Iterator<Item = &'a FitmentRecord>,
) -> Vec<VariantSummary> {
    let mut matched: Vec<&FitmentRecord> = records.collect();
    // Stable sort: among equal variants the earliest stored record keeps
    // supplying the engine/power shown.
    matched.sort_by(|a, b| a.vehicle_variant.cmp(&b.vehicle_variant));

    let mut out: Vec<VariantSummary> = Vec::new();
    for record in matched {
        if out
            .last()
            .is_some_and(|summary| summary.variant == record.vehicle_variant)
        {
            continue;
        }
        out.push(VariantSummary {
            variant: record.vehicle_variant.clone(),
            full_name: record.full_vehicle_model.clone(),
            engine_code: record.engine_code.clone(),
            power: record.power.clone(),
        });
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFitmentStore {
    records: Vec<FitmentRecord>,
}

impl MemoryFitmentStore {
    #[must_use]
    pub fn new(records: Vec<FitmentRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FitmentStore for MemoryFitmentStore {
    fn find_variants(&self, brand: &str, model: &str) -> Result<Vec<VariantSummary>> {
        Ok(variant_summaries(
            self.records
                .iter()
                .filter(|record| matches_model(record, brand, model)),
        ))
    }

    fn find_by_vehicle(
        &self,
        brand: &str,
        model: &str,
        engine: &str,
    ) -> Result<Vec<FitmentRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| matches_vehicle(record, brand, model, engine))
            .cloned()
            .collect())
    }

    fn find_by_model(&self, brand: &str, model: &str) -> Result<Vec<FitmentRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| matches_model(record, brand, model))
            .cloned()
            .collect())
    }
}
