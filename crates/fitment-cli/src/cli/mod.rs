use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "fitment")]
#[command(about = "Vehicle filter fitment database", version)]
pub struct Cli {
    #[arg(long, default_value = "fitment.db")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Consolidate a fitment CSV export and load it into the store.
    Import(ImportArgs),
    /// Load catalog products from a JSON file into the store.
    LoadCatalog(LoadCatalogArgs),
    /// List distinct vehicle variants for a brand and model.
    Variants(VariantsArgs),
    /// Search fitment records by brand, model, and engine.
    Search(SearchArgs),
    /// Resolve catalog products for every reference of one brand/model.
    Products(ProductsArgs),
    /// Match a single compatibility reference against the catalog.
    Match(MatchArgs),
    /// Resolve which filters fit a vehicle for one category.
    Resolve(ResolveArgs),
    /// Show store counts and last import metadata.
    Stats,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub csv: PathBuf,

    /// Write the import report to this JSON file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Append one report line to this JSONL log.
    #[arg(long)]
    pub report_log: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LoadCatalogArgs {
    pub products: PathBuf,
}

#[derive(Debug, Args)]
pub struct VariantsArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub engine: String,
    #[arg(long)]
    pub filter_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub variant: Option<String>,
    #[arg(long)]
    pub engine: Option<String>,
    #[arg(long)]
    pub filter_type: String,
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    pub compatibility_ref: String,
    #[arg(long)]
    pub filter_type: String,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub engine: String,
    #[arg(long)]
    pub filter_type: String,
}
