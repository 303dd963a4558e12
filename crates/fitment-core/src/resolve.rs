use std::collections::HashSet;

use crate::catalog::ProductCatalog;
use crate::error::Result;
use crate::matcher::{find_product_by_reference, match_available_product};
use crate::models::{
    CompatibilityMetadata, FilterCategory, FitmentRecord, MatchOutcome, MatchedProduct,
    ProductHit, ProductLookup, ResolutionStatus, UnavailableReference, VehicleFilterResolution,
};
use crate::repository::{FitmentStore, contains_ci};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSearch {
    pub brand: String,
    pub model: String,
    pub variant: Option<String>,
    pub engine: Option<String>,
    pub category: FilterCategory,
}

#[derive(Debug, Clone)]
pub struct ResolutionEngine<S, C> {
    store: S,
    catalog: C,
    result_cap: usize,
}

impl<S: FitmentStore, C: ProductCatalog> ResolutionEngine<S, C> {
    #[must_use]
    pub const fn new(store: S, catalog: C, result_cap: usize) -> Self {
        Self {
            store,
            catalog,
            result_cap,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    // State machine over one (vehicle, category) query. Every reference
    // is checked exactly once; "no match" at any stage is data, not an
    // error.
    pub fn get_filter_for_vehicle(
        &self,
        brand: &str,
        model: &str,
        engine: &str,
        category: FilterCategory,
    ) -> Result<VehicleFilterResolution> {
        let compatibilities = self.store.find_by_vehicle(brand, model, engine)?;
        let Some(compatibility) = compatibilities.first() else {
            return Ok(VehicleFilterResolution {
                status: ResolutionStatus::NoCompatibility,
                message: "No compatibility data found for this vehicle".to_string(),
                products: Vec::new(),
                unavailable: Vec::new(),
            });
        };

        let references = compatibility.filters.get(category);
        if references.is_empty() {
            return Ok(VehicleFilterResolution {
                status: ResolutionStatus::NoFilters,
                message: format!("No {category} filters found for this vehicle"),
                products: Vec::new(),
                unavailable: Vec::new(),
            });
        }

        let mut products = Vec::new();
        let mut unavailable = Vec::new();
        for reference in references {
            match match_available_product(&self.catalog, &reference.reference, category)? {
                Some(product) => products.push(MatchedProduct {
                    product,
                    compatibility_ref: reference.reference.clone(),
                    notes: reference.notes.clone(),
                }),
                None => unavailable.push(UnavailableReference {
                    reference: reference.reference.clone(),
                    notes: reference.notes.clone(),
                }),
            }
        }

        let resolution = if products.is_empty() {
            VehicleFilterResolution {
                status: ResolutionStatus::NoProducts,
                message: format!("No {category} filters available in catalog"),
                products,
                unavailable,
            }
        } else {
            VehicleFilterResolution {
                status: ResolutionStatus::Success,
                message: format!("Found {} available {category} filters", products.len()),
                products,
                unavailable,
            }
        };
        Ok(resolution)
    }

    pub fn match_product(
        &self,
        compatibility_ref: &str,
        category: FilterCategory,
    ) -> Result<MatchOutcome> {
        let product = match_available_product(&self.catalog, compatibility_ref, category)?;
        Ok(MatchOutcome {
            found: product.is_some(),
            product,
            compatibility_ref: compatibility_ref.to_string(),
            filter_type: category,
        })
    }

    // Bulk lookup across every record of one brand + model: each matching
    // reference contributes all of its catalog hits, deduplicated by
    // product reference across records.
    pub fn find_products(&self, search: &ProductSearch) -> Result<ProductLookup> {
        let records = self.store.find_by_model(&search.brand, &search.model)?;
        let mut lookup = ProductLookup::default();
        let mut seen_products: HashSet<String> = HashSet::new();
        let mut seen_available: HashSet<String> = HashSet::new();
        let mut seen_unavailable: HashSet<String> = HashSet::new();

        for record in records
            .iter()
            .filter(|record| record_matches_narrowing(record, search))
        {
            for reference in record.filters.get(search.category) {
                let matches = find_product_by_reference(
                    &self.catalog,
                    &reference.reference,
                    search.category,
                    self.result_cap,
                )?;

                if matches.is_empty() {
                    if seen_unavailable.insert(reference.reference.clone()) {
                        lookup.unavailable_references.push(UnavailableReference {
                            reference: reference.reference.clone(),
                            notes: reference.notes.clone(),
                        });
                    }
                    continue;
                }

                if seen_available.insert(reference.reference.clone()) {
                    lookup
                        .available_references
                        .push(reference.reference.clone());
                }
                for product in matches {
                    if !seen_products.insert(product.reference.clone()) {
                        continue;
                    }
                    lookup.products.push(ProductHit {
                        product,
                        compatibility: CompatibilityMetadata {
                            compatibility_ref: reference.reference.clone(),
                            full_vehicle_model: record.full_vehicle_model.clone(),
                            vehicle_variant: record.vehicle_variant.clone(),
                            engine_code: record.engine_code.clone(),
                            power: record.power.clone(),
                            notes: reference.notes.clone(),
                        },
                    });
                }
            }
        }
        Ok(lookup)
    }
}

fn record_matches_narrowing(record: &FitmentRecord, search: &ProductSearch) -> bool {
    if let Some(variant) = search.variant.as_deref()
        && !variant.is_empty()
        && !contains_ci(&record.full_vehicle_model, variant)
    {
        return false;
    }
    if let Some(engine) = search.engine.as_deref()
        && !engine.is_empty()
        && !contains_ci(&record.engine_code, engine)
    {
        return false;
    }
    true
}
