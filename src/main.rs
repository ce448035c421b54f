use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use catalog_migrate::catalog::{
    fetch_inventory, DedupCache, DestinationCatalog, EntityKind, IdMap, PathMapper,
};
use catalog_migrate::config::{self, Config, Overrides};
use catalog_migrate::importer::{ImportOptions, ImportSummary, Importer};
use catalog_migrate::providers::goonhub::GoonhubClient;
use catalog_migrate::providers::stash::StashClient;
use catalog_migrate::util::env as env_util;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "catalog-migrate",
    version,
    about = "Import a Stash catalog into GoonHub"
)]
struct Cli {
    /// Preview only: no changes at the destination, id map left untouched
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Import only the first N source scenes (overrides SCENE_LIMIT)
    #[arg(long)]
    scene_limit: Option<usize>,
    /// Path-mapping file
    #[arg(long)]
    mappings: Option<PathBuf>,
    /// Cross-reference file used to resume earlier runs
    #[arg(long)]
    id_map: Option<PathBuf>,
    /// Ask the destination not to verify that imported files exist
    #[arg(long, default_value_t = false)]
    skip_file_check: bool,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Overrides {
            dry_run: cli.dry_run,
            skip_file_check: cli.skip_file_check,
            scene_limit: cli.scene_limit,
            mappings: cli.mappings,
            id_map: cli.id_map,
        }
    }
}

fn print_summary(summary: &ImportSummary) {
    println!();
    println!("=== Import Summary ===");
    for (kind, s) in summary.phases() {
        println!(
            "  {:<10} {} created, {} skipped, {} errors",
            format!("{}:", kind.label()),
            s.created,
            s.skipped,
            s.errors
        );
    }
    let total = summary.total();
    println!(
        "  {:<10} {} created, {} skipped, {} errors",
        "Total:", total.created, total.skipped, total.errors
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    env_util::init_env();
    catalog_migrate::tracing::init_tracing("info")?;
    let cli = Cli::parse();

    // --- configuration -------------------------------------------------------
    env_util::preflight_check("catalog-migrate", config::REQUIRED_ENV, config::LOGGED_ENV)?;
    let mut cfg = Config::from_env().context("invalid configuration")?;
    cfg.apply(cli.into());
    if cfg.dry_run {
        info!("dry run: no changes will be made");
    }
    if let Some(limit) = cfg.scene_limit {
        info!(limit, "scene limit");
    }

    let rules = config::load_mappings(&cfg.mappings_file)?;
    info!(count = rules.len(), file = %cfg.mappings_file.display(), "loaded path mappings");
    let paths = PathMapper::new(rules);

    let id_map = IdMap::load(&cfg.id_map_file)?;
    if id_map.total() > 0 {
        info!(
            existing = id_map.total(),
            tags = id_map.len(EntityKind::Tag),
            studios = id_map.len(EntityKind::Studio),
            actors = id_map.len(EntityKind::Actor),
            scenes = id_map.len(EntityKind::Scene),
            markers = id_map.len(EntityKind::Marker),
            "resuming with existing mappings"
        );
    }

    // --- clients -------------------------------------------------------------
    let stash = StashClient::new(&cfg.stash_base_url, &cfg.stash_api_key, cfg.stash_timeout)?;
    let mut goonhub = GoonhubClient::new(&cfg.goonhub_base_url, cfg.goonhub)?;

    info!(username = %cfg.goonhub_username, "logging in to destination");
    goonhub
        .authenticate(&cfg.goonhub_username, &cfg.goonhub_password)
        .await
        .context("destination login failed")?;

    let dedup = DedupCache::prefetch(&goonhub).await?;

    // --- source snapshot -----------------------------------------------------
    let mut inventory = fetch_inventory(&stash).await?;
    if let Some(limit) = cfg.scene_limit {
        if inventory.scenes.len() > limit {
            info!(limit, "limiting scenes");
            inventory.limit_scenes(limit);
        }
    }
    info!(count = inventory.marker_count(), "found scene markers");

    // --- phases --------------------------------------------------------------
    let options = ImportOptions {
        dry_run: cfg.dry_run,
        skip_file_check: cfg.skip_file_check,
        marker_user_id: cfg.marker_user_id,
    };
    let mut importer = Importer::new(&goonhub, &paths, id_map, dedup, options);
    let summary = importer.run(&inventory, Some(&cfg.id_map_file)).await;

    print_summary(&summary);
    let total = summary.total();
    if !cfg.dry_run && total.created > 0 {
        let hint = format!(
            "curl -X POST {}/api/v1/admin/search/reindex -H \"Authorization: Bearer <token>\"",
            cfg.goonhub_base_url
        );
        info!(%hint, "remember to rebuild the destination search index");
    }

    if total.errors > 0 {
        warn!(errors = total.errors, "import finished with errors");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
