use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consolidate::{ConsolidationOutcome, ConsolidationStats};
use crate::error::Result;
use crate::models::{FilterCategory, FitmentRecord};

const TOP_BRAND_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub oil: usize,
    pub air: usize,
    pub diesel: usize,
    pub cabin: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandCount {
    pub brand: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported_at: DateTime<Utc>,
    pub source: String,
    pub source_hash: String,
    pub stats: ConsolidationStats,
    pub reduction_percent: f64,
    pub category_distribution: CategoryDistribution,
    pub top_brands: Vec<BrandCount>,
}

impl ImportReport {
    #[must_use]
    pub fn build(source: &str, source_hash: String, outcome: &ConsolidationOutcome) -> Self {
        Self {
            imported_at: Utc::now(),
            source: source.to_string(),
            source_hash,
            stats: outcome.stats,
            reduction_percent: outcome.stats.reduction_percent(),
            category_distribution: category_distribution(&outcome.records),
            top_brands: top_brands(&outcome.records),
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn append_jsonl(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[must_use]
pub fn hash_source(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn category_distribution(records: &[FitmentRecord]) -> CategoryDistribution {
    let mut distribution = CategoryDistribution::default();
    for record in records {
        for category in FilterCategory::ALL {
            if record.filters.get(category).is_empty() {
                continue;
            }
            match category {
                FilterCategory::Oil => distribution.oil += 1,
                FilterCategory::Air => distribution.air += 1,
                FilterCategory::Diesel => distribution.diesel += 1,
                FilterCategory::Cabin => distribution.cabin += 1,
            }
        }
    }
    distribution
}

fn top_brands(records: &[FitmentRecord]) -> Vec<BrandCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.brand.as_str()).or_default() += 1;
    }
    let mut brands: Vec<BrandCount> = counts
        .into_iter()
        .map(|(brand, records)| BrandCount {
            brand: brand.to_string(),
            records,
        })
        .collect();
    brands.sort_by(|a, b| b.records.cmp(&a.records).then_with(|| a.brand.cmp(&b.brand)));
    brands.truncate(TOP_BRAND_LIMIT);
    brands
}

pub fn stats_summary(stats: &ConsolidationStats) -> String {
    format!(
        "rows: {} | consolidated: {} | reduction: {:.1}% | processed: {} | errors: {}",
        stats.original_rows,
        stats.consolidated_records,
        stats.reduction_percent(),
        stats.processed_rows,
        stats.error_rows
    )
}
