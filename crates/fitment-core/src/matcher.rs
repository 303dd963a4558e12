use crate::catalog::ProductCatalog;
use crate::error::Result;
use crate::models::{CatalogProduct, FilterCategory};

// Bound on bulk reference lookups; single-product matching never scans
// past the first ordered candidate.
pub const MATCH_RESULT_CAP: usize = 100;

// Compatibility references carry a numeric table prefix: "37-L330" names
// catalog code "L330". Production references grow suffix letters over time
// ("L330" -> "L330AY"), which the forward-prefix fallback absorbs without
// re-synchronizing the compatibility table.
pub fn match_available_product(
    catalog: &impl ProductCatalog,
    compatibility_ref: &str,
    category: FilterCategory,
) -> Result<Option<CatalogProduct>> {
    let parts: Vec<&str> = compatibility_ref.split('-').collect();
    if parts.len() < 2 {
        // Malformed reference is a per-reference miss, never an error.
        return Ok(None);
    }
    let code = parts[1].trim();
    if code.is_empty() {
        return Ok(None);
    }

    let exact = order_candidates(catalog.find_exact(code, category)?);
    if let Some(product) = exact.into_iter().next() {
        return Ok(Some(product));
    }

    let prefixed = order_candidates(catalog.find_with_prefix(code, category)?);
    Ok(prefixed.into_iter().next())
}

// Variants to try when matching a loosely-specified reference: the raw
// string, and without its table prefix when one is present.
#[must_use]
pub fn clean_filter_reference(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().to_string();
    let mut variants = vec![trimmed.clone()];
    if trimmed.contains('-') {
        let without_prefix = trimmed
            .split('-')
            .skip(1)
            .collect::<Vec<_>>()
            .join("-")
            .trim()
            .to_string();
        variants.push(without_prefix);
    }
    variants
}

// Bulk variant of the matcher: same exact-then-prefix sequence, but all
// matches are returned, capped to avoid unbounded scans.
pub fn find_product_by_reference(
    catalog: &impl ProductCatalog,
    raw_ref: &str,
    category: FilterCategory,
    result_cap: usize,
) -> Result<Vec<CatalogProduct>> {
    let variants = clean_filter_reference(raw_ref);
    let cleaned = variants.get(1).unwrap_or(&variants[0]);
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    let mut exact = order_candidates(catalog.find_exact(cleaned, category)?);
    if !exact.is_empty() {
        exact.truncate(result_cap);
        return Ok(exact);
    }

    let mut prefixed = order_candidates(catalog.find_with_prefix(cleaned, category)?);
    prefixed.truncate(result_cap);
    Ok(prefixed)
}

// Deterministic tie-break: shortest suffix first, then lexicographic. The
// source relied on incidental store order here.
fn order_candidates(mut candidates: Vec<CatalogProduct>) -> Vec<CatalogProduct> {
    candidates.sort_by(|a, b| {
        a.reference
            .len()
            .cmp(&b.reference.len())
            .then_with(|| a.reference.cmp(&b.reference))
    });
    candidates
}
