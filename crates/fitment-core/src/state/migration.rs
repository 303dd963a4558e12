use rusqlite::Connection;

use crate::error::Result;

use super::SqliteFitmentStore;

const SCHEMA_VERSION: &str = "1";

const MIGRATION_SCHEMA_SQL: &str = r"
    PRAGMA journal_mode = WAL;

    CREATE TABLE IF NOT EXISTS fitment_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        brand TEXT NOT NULL,
        type_model TEXT NOT NULL,
        full_vehicle_model TEXT NOT NULL,
        vehicle_variant TEXT NOT NULL,
        engine_code TEXT NOT NULL,
        power TEXT NOT NULL,
        production_start TEXT NOT NULL,
        production_end TEXT NOT NULL,
        filters_json TEXT NOT NULL,
        metadata_json TEXT NOT NULL,
        UNIQUE(brand, full_vehicle_model, engine_code, power)
    );

    CREATE INDEX IF NOT EXISTS idx_fitment_records_brand_model
    ON fitment_records(brand, type_model);

    CREATE TABLE IF NOT EXISTS catalog_products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        reference TEXT NOT NULL,
        filter_category TEXT NOT NULL
            CHECK(filter_category IN ('oil', 'air', 'diesel', 'cabin')),
        is_active INTEGER NOT NULL,
        name TEXT,
        UNIQUE(reference, filter_category)
    );

    CREATE INDEX IF NOT EXISTS idx_catalog_products_category
    ON catalog_products(filter_category, is_active);

    CREATE TABLE IF NOT EXISTS store_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

impl SqliteFitmentStore {
    pub(super) fn migrate(&self) -> Result<()> {
        self.with_conn(|conn| {
            apply_schema(conn)?;
            Ok(())
        })?;
        self.set_meta("schema_version", SCHEMA_VERSION)
    }
}

fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(MIGRATION_SCHEMA_SQL)?;
    Ok(())
}
