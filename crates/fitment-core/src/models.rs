use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FitmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    Oil,
    Air,
    Diesel,
    Cabin,
}

impl FilterCategory {
    pub const ALL: [Self; 4] = [Self::Oil, Self::Air, Self::Diesel, Self::Cabin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oil => "oil",
            Self::Air => "air",
            Self::Diesel => "diesel",
            Self::Cabin => "cabin",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCategory {
    type Err = FitmentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "oil" => Ok(Self::Oil),
            "air" => Ok(Self::Air),
            "diesel" => Ok(Self::Diesel),
            "cabin" => Ok(Self::Cabin),
            other => Err(FitmentError::Validation(format!(
                "unknown filter category: '{other}' (expected oil, air, diesel, or cabin)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReference {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub oil: Vec<FilterReference>,
    #[serde(default)]
    pub air: Vec<FilterReference>,
    #[serde(default)]
    pub diesel: Vec<FilterReference>,
    #[serde(default)]
    pub cabin: Vec<FilterReference>,
}

impl FilterSet {
    #[must_use]
    pub const fn get(&self, category: FilterCategory) -> &Vec<FilterReference> {
        match category {
            FilterCategory::Oil => &self.oil,
            FilterCategory::Air => &self.air,
            FilterCategory::Diesel => &self.diesel,
            FilterCategory::Cabin => &self.cabin,
        }
    }

    pub fn get_mut(&mut self, category: FilterCategory) -> &mut Vec<FilterReference> {
        match category {
            FilterCategory::Oil => &mut self.oil,
            FilterCategory::Air => &mut self.air,
            FilterCategory::Diesel => &mut self.diesel,
            FilterCategory::Cabin => &mut self.cabin,
        }
    }

    #[must_use]
    pub fn total_references(&self) -> usize {
        FilterCategory::ALL
            .iter()
            .map(|&category| self.get(category).len())
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub chassis_note: Option<String>,
    pub general_comment: Option<String>,
}

// Persisted JSON shape is the boundary contract between consolidation
// output and the repository; field names stay camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitmentRecord {
    pub brand: String,
    pub type_model: String,
    pub full_vehicle_model: String,
    pub vehicle_variant: String,
    pub engine_code: String,
    pub power: String,
    pub production_start: String,
    pub production_end: String,
    pub filters: FilterSet,
    pub metadata: RecordMetadata,
}

impl FitmentRecord {
    #[must_use]
    pub fn composite_key(&self) -> CompositeKey {
        CompositeKey {
            brand: self.brand.clone(),
            full_vehicle_model: self.full_vehicle_model.clone(),
            engine_code: self.engine_code.clone(),
            power: self.power.clone(),
        }
    }
}

// Deduplication identity for consolidation: one record per unique
// brand + full model + engine + power.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub brand: String,
    pub full_vehicle_model: String,
    pub engine_code: String,
    pub power: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub variant: String,
    pub full_name: String,
    pub engine_code: String,
    pub power: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub reference: String,
    pub filter_type: FilterCategory,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    NoCompatibility,
    NoFilters,
    NoProducts,
    Success,
}

impl ResolutionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCompatibility => "no_compatibility",
            Self::NoFilters => "no_filters",
            Self::NoProducts => "no_products",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedProduct {
    pub product: CatalogProduct,
    pub compatibility_ref: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableReference {
    #[serde(rename = "ref")]
    pub reference: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilterResolution {
    pub status: ResolutionStatus,
    pub message: String,
    pub products: Vec<MatchedProduct>,
    pub unavailable: Vec<UnavailableReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityMetadata {
    pub compatibility_ref: String,
    pub full_vehicle_model: String,
    pub vehicle_variant: String,
    pub engine_code: String,
    pub power: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductHit {
    pub product: CatalogProduct,
    pub compatibility: CompatibilityMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLookup {
    pub products: Vec<ProductHit>,
    pub available_references: Vec<String>,
    pub unavailable_references: Vec<UnavailableReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<CatalogProduct>,
    pub compatibility_ref: String,
    pub filter_type: FilterCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "Diesel".parse::<FilterCategory>().expect("parse"),
            FilterCategory::Diesel
        );
        assert!("petrol".parse::<FilterCategory>().is_err());
    }

    #[test]
    fn record_serializes_with_boundary_field_names() {
        let record = FitmentRecord {
            brand: "ABARTH".to_string(),
            type_model: "500 II".to_string(),
            full_vehicle_model: "500 II / 595 1.4 Turbo".to_string(),
            vehicle_variant: "595 1.4 Turbo".to_string(),
            engine_code: "312A1000".to_string(),
            power: "135".to_string(),
            production_start: "01/2008".to_string(),
            production_end: String::new(),
            filters: FilterSet {
                oil: vec![FilterReference {
                    reference: "37-L330".to_string(),
                    notes: vec!["Date: 01/2008".to_string()],
                }],
                ..FilterSet::default()
            },
            metadata: RecordMetadata::default(),
        };

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["typeModel"], "500 II");
        assert_eq!(json["fullVehicleModel"], "500 II / 595 1.4 Turbo");
        assert_eq!(json["filters"]["oil"][0]["ref"], "37-L330");
        assert_eq!(json["metadata"]["chassisNote"], serde_json::Value::Null);
    }

    #[test]
    fn status_serializes_snake_case() {
        let value = serde_json::to_value(ResolutionStatus::NoCompatibility).expect("serialize");
        assert_eq!(value, "no_compatibility");
        assert_eq!(ResolutionStatus::Success.as_str(), "success");
    }
}
