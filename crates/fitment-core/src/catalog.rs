use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::models::{CatalogProduct, FilterCategory};

// Read-only collaborator owned by the product catalog; the engine only
// consumes lookups over active products.
pub trait ProductCatalog {
    fn find_exact(&self, code: &str, category: FilterCategory) -> Result<Vec<CatalogProduct>>;

    // Forward prefix: the catalog reference extends the compatibility code
    // (code "L330" matches catalog "L330AY"). Includes exact matches.
    fn find_with_prefix(&self, code: &str, category: FilterCategory)
    -> Result<Vec<CatalogProduct>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProductCatalog {
    products: Vec<CatalogProduct>,
}

impl MemoryProductCatalog {
    #[must_use]
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn active_of(&self, category: FilterCategory) -> impl Iterator<Item = &CatalogProduct> {
        self.products
            .iter()
            .filter(move |product| product.is_active && product.filter_type == category)
    }
}

impl ProductCatalog for MemoryProductCatalog {
    fn find_exact(&self, code: &str, category: FilterCategory) -> Result<Vec<CatalogProduct>> {
        Ok(self
            .active_of(category)
            .filter(|product| product.reference == code)
            .cloned()
            .collect())
    }

    fn find_with_prefix(
        &self,
        code: &str,
        category: FilterCategory,
    ) -> Result<Vec<CatalogProduct>> {
        Ok(self
            .active_of(category)
            .filter(|product| product.reference.starts_with(code))
            .cloned()
            .collect())
    }
}

pub fn load_products_json(path: impl AsRef<Path>) -> Result<Vec<CatalogProduct>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn product(reference: &str, category: FilterCategory, active: bool) -> CatalogProduct {
        CatalogProduct {
            reference: reference.to_string(),
            filter_type: category,
            is_active: active,
            name: None,
        }
    }

    #[test]
    fn lookups_ignore_inactive_and_other_categories() {
        let catalog = MemoryProductCatalog::new(vec![
            product("L330", FilterCategory::Oil, false),
            product("L330", FilterCategory::Air, true),
            product("L330AY", FilterCategory::Oil, true),
        ]);

        assert!(
            catalog
                .find_exact("L330", FilterCategory::Oil)
                .expect("exact")
                .is_empty()
        );
        let prefixed = catalog
            .find_with_prefix("L330", FilterCategory::Oil)
            .expect("prefix");
        assert_eq!(prefixed.len(), 1);
        assert_eq!(prefixed[0].reference, "L330AY");
    }

    #[test]
    fn prefix_lookup_includes_exact_matches() {
        let catalog = MemoryProductCatalog::new(vec![
            product("CS701", FilterCategory::Cabin, true),
            product("CS701AY", FilterCategory::Cabin, true),
        ]);
        let hits = catalog
            .find_with_prefix("CS701", FilterCategory::Cabin)
            .expect("prefix");
        assert_eq!(hits.len(), 2);
    }
}
