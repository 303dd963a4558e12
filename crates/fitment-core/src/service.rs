use serde::{Deserialize, Serialize};

use crate::catalog::ProductCatalog;
use crate::config::MatchConfig;
use crate::error::{FitmentError, Result};
use crate::models::{
    FilterCategory, FitmentRecord, MatchOutcome, ProductLookup, VariantSummary,
    VehicleFilterResolution,
};
use crate::repository::FitmentStore;
use crate::resolve::{ProductSearch, ResolutionEngine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsMeta {
    pub total: usize,
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantsResponse {
    pub data: Vec<VariantSummary>,
    pub meta: VariantsMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryEcho {
    pub brand: String,
    pub model: String,
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMeta {
    pub total: usize,
    pub filters: SearchQueryEcho,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<FitmentRecord>,
    pub meta: SearchMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsMeta {
    pub brand: String,
    pub model: String,
    pub filter_type: FilterCategory,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub data: ProductLookup,
    pub meta: ProductsMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProductResponse {
    pub data: MatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveMeta {
    pub filter_type: FilterCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub data: VehicleFilterResolution,
    pub meta: ResolveMeta,
}

// Query surface over the resolution engine. Required parameters are
// rejected up front; "no match" outcomes are returned as data.
#[derive(Debug, Clone)]
pub struct FitmentService<S, C> {
    engine: ResolutionEngine<S, C>,
}

impl<S: FitmentStore, C: ProductCatalog> FitmentService<S, C> {
    #[must_use]
    pub fn new(store: S, catalog: C, config: MatchConfig) -> Self {
        Self {
            engine: ResolutionEngine::new(store, catalog, config.result_cap),
        }
    }

    #[must_use]
    pub const fn engine(&self) -> &ResolutionEngine<S, C> {
        &self.engine
    }

    pub fn get_variants(&self, brand: &str, model: &str) -> Result<VariantsResponse> {
        let brand = required("brand", brand)?;
        let model = required("model", model)?;
        let data = self.engine.store().find_variants(brand, model)?;
        Ok(VariantsResponse {
            meta: VariantsMeta {
                total: data.len(),
                brand: brand.to_string(),
                model: model.to_string(),
            },
            data,
        })
    }

    pub fn search(
        &self,
        brand: &str,
        model: &str,
        engine: &str,
        filter_type: Option<FilterCategory>,
    ) -> Result<SearchResponse> {
        let brand = required("brand", brand)?;
        let model = required("model", model)?;
        let engine = required("engine", engine)?;
        let data = self.engine.store().find_by_vehicle(brand, model, engine)?;
        Ok(SearchResponse {
            meta: SearchMeta {
                total: data.len(),
                filters: SearchQueryEcho {
                    brand: brand.to_string(),
                    model: model.to_string(),
                    engine: engine.to_string(),
                    filter_type,
                },
            },
            data,
        })
    }

    pub fn find_products(&self, search: &ProductSearch) -> Result<ProductsResponse> {
        required("brand", &search.brand)?;
        required("model", &search.model)?;
        let data = self.engine.find_products(search)?;
        Ok(ProductsResponse {
            meta: ProductsMeta {
                brand: search.brand.clone(),
                model: search.model.clone(),
                filter_type: search.category,
                total: data.products.len(),
            },
            data,
        })
    }

    pub fn match_product(
        &self,
        compatibility_ref: &str,
        filter_type: FilterCategory,
    ) -> Result<MatchProductResponse> {
        let compatibility_ref = required("compatibilityRef", compatibility_ref)?;
        Ok(MatchProductResponse {
            data: self.engine.match_product(compatibility_ref, filter_type)?,
        })
    }

    pub fn get_filter_for_vehicle(
        &self,
        brand: &str,
        model: &str,
        engine: &str,
        filter_type: FilterCategory,
    ) -> Result<ResolveResponse> {
        let brand = required("brand", brand)?;
        let model = required("model", model)?;
        let engine = required("engine", engine)?;
        Ok(ResolveResponse {
            data: self
                .engine
                .get_filter_for_vehicle(brand, model, engine, filter_type)?,
            meta: ResolveMeta { filter_type },
        })
    }
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FitmentError::missing_parameter(name));
    }
    Ok(trimmed)
}
