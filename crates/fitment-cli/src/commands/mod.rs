use std::path::Path;

use anyhow::{Context, Result};
use fitment_core::catalog::load_products_json;
use fitment_core::config::{ImportConfig, MatchConfig};
use fitment_core::consolidate::consolidate_reader;
use fitment_core::report::{ImportReport, hash_source, stats_summary};
use fitment_core::resolve::ProductSearch;
use fitment_core::{FilterCategory, FitmentService, SqliteFitmentStore};

use crate::cli::{
    Commands, ImportArgs, LoadCatalogArgs, MatchArgs, ProductsArgs, ResolveArgs, SearchArgs,
    VariantsArgs,
};

pub(crate) fn run(store_path: &Path, command: Commands) -> Result<()> {
    let store = SqliteFitmentStore::open(store_path)
        .with_context(|| format!("failed to open store at {}", store_path.display()))?;

    match command {
        Commands::Import(args) => run_import(&store, &args),
        Commands::LoadCatalog(args) => run_load_catalog(&store, &args),
        Commands::Variants(args) => run_variants(&store, &args),
        Commands::Search(args) => run_search(&store, &args),
        Commands::Products(args) => run_products(&store, &args),
        Commands::Match(args) => run_match(&store, &args),
        Commands::Resolve(args) => run_resolve(&store, &args),
        Commands::Stats => run_stats(&store),
    }
}

fn service(store: &SqliteFitmentStore) -> FitmentService<SqliteFitmentStore, SqliteFitmentStore> {
    FitmentService::new(store.clone(), store.clone(), MatchConfig::from_env())
}

fn run_import(store: &SqliteFitmentStore, args: &ImportArgs) -> Result<()> {
    let source = args.csv.display().to_string();
    let bytes = std::fs::read(&args.csv).with_context(|| format!("failed to read {source}"))?;
    let outcome = consolidate_reader(bytes.as_slice()).context("consolidation failed")?;

    let config = ImportConfig::from_env();
    let written = store
        .replace_records(&outcome.records, &config)
        .context("failed to write fitment records")?;

    let report = ImportReport::build(&source, hash_source(&bytes), &outcome);
    store.set_meta("last_import", &serde_json::to_string(&report)?)?;
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    if let Some(path) = &args.report_log {
        report.append_jsonl(path)?;
    }

    println!("imported {written} records from {source}");
    println!("{}", stats_summary(&outcome.stats));
    Ok(())
}

fn run_load_catalog(store: &SqliteFitmentStore, args: &LoadCatalogArgs) -> Result<()> {
    let products = load_products_json(&args.products)
        .with_context(|| format!("failed to load {}", args.products.display()))?;
    let written = store.replace_products(&products, &ImportConfig::from_env())?;
    println!("loaded {written} catalog products");
    Ok(())
}

fn run_variants(store: &SqliteFitmentStore, args: &VariantsArgs) -> Result<()> {
    let response = service(store).get_variants(&args.brand, &args.model)?;
    print_json(&response)
}

fn run_search(store: &SqliteFitmentStore, args: &SearchArgs) -> Result<()> {
    let filter_type = parse_optional_category(args.filter_type.as_deref())?;
    let response = service(store).search(&args.brand, &args.model, &args.engine, filter_type)?;
    print_json(&response)
}

fn run_products(store: &SqliteFitmentStore, args: &ProductsArgs) -> Result<()> {
    let response = service(store).find_products(&ProductSearch {
        brand: args.brand.clone(),
        model: args.model.clone(),
        variant: args.variant.clone(),
        engine: args.engine.clone(),
        category: args.filter_type.parse::<FilterCategory>()?,
    })?;
    print_json(&response)
}

fn run_match(store: &SqliteFitmentStore, args: &MatchArgs) -> Result<()> {
    let category = args.filter_type.parse::<FilterCategory>()?;
    let response = service(store).match_product(&args.compatibility_ref, category)?;
    print_json(&response)
}

fn run_resolve(store: &SqliteFitmentStore, args: &ResolveArgs) -> Result<()> {
    let category = args.filter_type.parse::<FilterCategory>()?;
    let response =
        service(store).get_filter_for_vehicle(&args.brand, &args.model, &args.engine, category)?;
    print_json(&response)
}

fn run_stats(store: &SqliteFitmentStore) -> Result<()> {
    println!("fitment records: {}", store.record_count()?);
    println!("catalog products: {}", store.product_count()?);
    match store.get_meta("last_import")? {
        Some(raw) => {
            let report: serde_json::Value = serde_json::from_str(&raw)?;
            println!("last import: {}", serde_json::to_string_pretty(&report)?);
        }
        None => println!("last import: none"),
    }
    Ok(())
}

fn parse_optional_category(raw: Option<&str>) -> Result<Option<FilterCategory>> {
    raw.map(|value| value.parse::<FilterCategory>())
        .transpose()
        .map_err(Into::into)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
