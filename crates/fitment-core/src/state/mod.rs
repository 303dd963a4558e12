use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::batch::process_in_batches;
use crate::catalog::ProductCatalog;
use crate::config::ImportConfig;
use crate::error::{FitmentError, Result};
use crate::models::{
    CatalogProduct, FilterCategory, FilterSet, FitmentRecord, RecordMetadata, VariantSummary,
};
use crate::repository::{FitmentStore, matches_model, matches_vehicle, variant_summaries};

mod migration;

// Single-file store backing both the fitment dataset and the product
// catalog. Writes happen only during import; query-time access is
// read-only, so the connection mutex is uncontended in practice.
#[derive(Clone)]
pub struct SqliteFitmentStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteFitmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteFitmentStore").finish_non_exhaustive()
    }
}

impl SqliteFitmentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| FitmentError::mutex_poisoned("sqlite"))?;
        f(&conn)
    }

    fn with_tx<T>(&self, f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| FitmentError::mutex_poisoned("sqlite"))?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        drop(conn);
        Ok(value)
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM store_meta WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO store_meta(key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
    }

    // One transaction: readers never observe a half-imported dataset.
    // Inserts still flow through the bounded-chunk stage, which is where
    // a live feed would pause between chunks.
    pub fn replace_records(
        &self,
        records: &[FitmentRecord],
        config: &ImportConfig,
    ) -> Result<usize> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM fitment_records", [])?;
            let mut stmt = tx.prepare(
                r"
                INSERT INTO fitment_records(
                    brand, type_model, full_vehicle_model, vehicle_variant,
                    engine_code, power, production_start, production_end,
                    filters_json, metadata_json
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ",
            )?;
            process_in_batches(records, config, |chunk| {
                for record in chunk {
                    stmt.execute(params![
                        record.brand,
                        record.type_model,
                        record.full_vehicle_model,
                        record.vehicle_variant,
                        record.engine_code,
                        record.power,
                        record.production_start,
                        record.production_end,
                        serde_json::to_string(&record.filters)?,
                        serde_json::to_string(&record.metadata)?,
                    ])?;
                }
                Ok(())
            })
        })
    }

    pub fn replace_products(
        &self,
        products: &[CatalogProduct],
        config: &ImportConfig,
    ) -> Result<usize> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM catalog_products", [])?;
            let mut stmt = tx.prepare(
                r"
                INSERT INTO catalog_products(reference, filter_category, is_active, name)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(reference, filter_category) DO UPDATE SET
                  is_active = excluded.is_active,
                  name = excluded.name
                ",
            )?;
            process_in_batches(products, config, |chunk| {
                for product in chunk {
                    stmt.execute(params![
                        product.reference,
                        product.filter_type.as_str(),
                        i64::from(product.is_active),
                        product.name,
                    ])?;
                }
                Ok(())
            })
        })
    }

    pub fn record_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM fitment_records")
    }

    pub fn product_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM catalog_products")
    }

    fn count(&self, sql: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let count = conn.query_row(sql, [], |row| row.get::<_, i64>(0))?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
    }

    // Predicates for model/engine containment live in `repository` and
    // are shared with the in-memory store, so both implementations agree;
    // SQL narrows to the brand, Rust applies the rest.
    fn brand_records(&self, brand: &str) -> Result<Vec<FitmentRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT brand, type_model, full_vehicle_model, vehicle_variant,
                       engine_code, power, production_start, production_end,
                       filters_json, metadata_json
                FROM fitment_records
                WHERE brand = ?1
                ORDER BY id ASC
                ",
            )?;
            let rows = stmt.query_map(params![brand], decode_record)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    fn category_products(&self, category: FilterCategory) -> Result<Vec<CatalogProduct>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT reference, filter_category, is_active, name
                FROM catalog_products
                WHERE filter_category = ?1 AND is_active = 1
                ORDER BY id ASC
                ",
            )?;
            let rows = stmt.query_map(params![category.as_str()], decode_product)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}

impl FitmentStore for SqliteFitmentStore {
    fn find_variants(&self, brand: &str, model: &str) -> Result<Vec<VariantSummary>> {
        let records = self.brand_records(brand)?;
        Ok(variant_summaries(
            records
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
        let mut records = self.brand_records(brand)?;
        records.retain(|record| matches_vehicle(record, brand, model, engine));
        Ok(records)
    }

    fn find_by_model(&self, brand: &str, model: &str) -> Result<Vec<FitmentRecord>> {
        let mut records = self.brand_records(brand)?;
        records.retain(|record| matches_model(record, brand, model));
        Ok(records)
    }
}

impl ProductCatalog for SqliteFitmentStore {
    fn find_exact(&self, code: &str, category: FilterCategory) -> Result<Vec<CatalogProduct>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT reference, filter_category, is_active, name
                FROM catalog_products
                WHERE reference = ?1 AND filter_category = ?2 AND is_active = 1
                ORDER BY id ASC
                ",
            )?;
            let rows = stmt.query_map(params![code, category.as_str()], decode_product)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    fn find_with_prefix(
        &self,
        code: &str,
        category: FilterCategory,
    ) -> Result<Vec<CatalogProduct>> {
        let mut products = self.category_products(category)?;
        products.retain(|product| product.reference.starts_with(code));
        Ok(products)
    }
}

fn decode_record(row: &Row<'_>) -> rusqlite::Result<FitmentRecord> {
    let filters_raw = row.get::<_, String>(8)?;
    let metadata_raw = row.get::<_, String>(9)?;
    let filters: FilterSet = serde_json::from_str(&filters_raw)
        .map_err(|err| decode_error(8, &err))?;
    let metadata: RecordMetadata = serde_json::from_str(&metadata_raw)
        .map_err(|err| decode_error(9, &err))?;
    Ok(FitmentRecord {
        brand: row.get(0)?,
        type_model: row.get(1)?,
        full_vehicle_model: row.get(2)?,
        vehicle_variant: row.get(3)?,
        engine_code: row.get(4)?,
        power: row.get(5)?,
        production_start: row.get(6)?,
        production_end: row.get(7)?,
        filters,
        metadata,
    })
}

fn decode_product(row: &Row<'_>) -> rusqlite::Result<CatalogProduct> {
    let category_raw = row.get::<_, String>(1)?;
    let filter_type = category_raw
        .parse::<FilterCategory>()
        .map_err(|err| decode_error(1, &err))?;
    Ok(CatalogProduct {
        reference: row.get(0)?,
        filter_type,
        is_active: row.get::<_, i64>(2)? != 0,
        name: row.get(3)?,
    })
}

fn decode_error(
    column: usize,
    err: &dyn std::error::Error,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        err.to_string().into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::consolidate_reader;

    fn import_config() -> ImportConfig {
        ImportConfig {
            batch_size: 2,
            batch_pause_ms: 0,
        }
    }

    fn seeded_store() -> SqliteFitmentStore {
        let raw = "ABARTH;500 II;500 II 1.4 Turbo 135;135;312A1000;01/2008;;;;;A9;;;37-L330\n\
                   ABARTH;500 II;500 II 1.4 Turbo 160;160;312A3000;03/2012;;;;;;;;37-L358\n\
                   FIAT;PANDA;PANDA 1.2;60;169A4000;;;;;;;C7;;\n";
        let outcome = consolidate_reader(raw.as_bytes()).expect("consolidate");

        let store = SqliteFitmentStore::open_in_memory().expect("open");
        store
            .replace_records(&outcome.records, &import_config())
            .expect("replace records");
        store
            .replace_products(
                &[
                    CatalogProduct {
                        reference: "L330AY".to_string(),
                        filter_type: FilterCategory::Oil,
                        is_active: true,
                        name: Some("Oil filter L330AY".to_string()),
                    },
                    CatalogProduct {
                        reference: "L358".to_string(),
                        filter_type: FilterCategory::Oil,
                        is_active: false,
                        name: None,
                    },
                ],
                &import_config(),
            )
            .expect("replace products");
        store
    }

    #[test]
    fn records_round_trip_through_sqlite() {
        let store = seeded_store();
        assert_eq!(store.record_count().expect("count"), 3);

        let hits = store
            .find_by_vehicle("ABARTH", "turbo 135", "312a")
            .expect("hits");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filters.oil[0].reference, "37-L330");
        assert_eq!(hits[0].filters.air[0].reference, "A9");
    }

    #[test]
    fn variants_come_back_sorted_and_distinct() {
        let store = seeded_store();
        let variants = store.find_variants("ABARTH", "500 II").expect("variants");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].variant, "1.4 Turbo 135");
        assert_eq!(variants[1].variant, "1.4 Turbo 160");
    }

    #[test]
    fn inactive_products_are_invisible_to_lookups() {
        let store = seeded_store();
        assert!(
            store
                .find_exact("L358", FilterCategory::Oil)
                .expect("exact")
                .is_empty()
        );
        let prefixed = store
            .find_with_prefix("L330", FilterCategory::Oil)
            .expect("prefix");
        assert_eq!(prefixed.len(), 1);
        assert_eq!(prefixed[0].reference, "L330AY");
    }

    #[test]
    fn replace_records_swaps_the_whole_dataset() {
        let store = seeded_store();
        store
            .replace_records(&[], &import_config())
            .expect("replace with empty");
        assert_eq!(store.record_count().expect("count"), 0);
        assert!(
            store
                .find_by_vehicle("ABARTH", "500", "312")
                .expect("hits")
                .is_empty()
        );
    }

    #[test]
    fn meta_values_upsert() {
        let store = SqliteFitmentStore::open_in_memory().expect("open");
        store.set_meta("last_import", "a.csv").expect("set");
        store.set_meta("last_import", "b.csv").expect("set again");
        assert_eq!(
            store.get_meta("last_import").expect("get").as_deref(),
            Some("b.csv")
        );
        assert!(store.get_meta("missing").expect("get").is_none());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("fitment.db");
        let store = SqliteFitmentStore::open(&path).expect("open");
        assert_eq!(store.record_count().expect("count"), 0);
        assert!(path.exists());
    }
}
