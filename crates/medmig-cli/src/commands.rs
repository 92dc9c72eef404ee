use anyhow::{Context, Result};
use chrono::Datelike;
use tracing::{debug, info};

use medmig_cli::config::{MigrationConfig, load_env_file};
use medmig_cli::pipeline::{MigrationOptions, check_source, crud_demo, migrate, open_collection};
use medmig_cli::types::{CrudStep, MigrationResult, SourceCheck};
use medmig_store::LoadMode;
use medmig_transform::{ConflictPolicy, IdentityStrategy};
use medmig_validate::{DuplicateKey, PreValidationOptions};

use crate::cli::{ConflictArg, DuplicateKeyArg, EnvArgs, MigrateArgs, SourceArgs};

pub fn run_migrate(args: &MigrateArgs) -> Result<MigrationResult> {
    let config = load_config(&args.source.env)?
        .with_data_file(args.source.data_file.clone())
        .with_reference_year(args.source.reference_year);
    config.data_file()?;

    let identity = identity_strategy(&args.source, &config);
    let mut options = MigrationOptions::new(identity.clone());
    options.duplicate_key = duplicate_key(args.source.duplicate_key, identity);
    options.conflicts = match args.on_conflict {
        ConflictArg::FirstWins => ConflictPolicy::FirstWins,
        ConflictArg::Reject => ConflictPolicy::Reject,
    };
    options.load_mode = if args.upsert {
        LoadMode::Upsert
    } else {
        LoadMode::Replace
    };
    options.dry_run = args.dry_run;
    info!(identity = %options.identity.label(), "starting migration");

    migrate(&config, &options)
}

pub fn run_validate(args: &SourceArgs) -> Result<SourceCheck> {
    let config = load_config(&args.env)?
        .with_data_file(args.data_file.clone())
        .with_reference_year(args.reference_year);
    let path = config.data_file()?.to_path_buf();
    let identity = identity_strategy(args, &config);
    let options = PreValidationOptions::new(duplicate_key(args.duplicate_key, identity));
    check_source(&path, &options)
}

pub fn run_crud_demo(args: &EnvArgs) -> Result<Vec<CrudStep>> {
    let config = load_config(args)?;
    let collection = open_collection(&config)?;
    crud_demo(&collection)
}

fn load_config(args: &EnvArgs) -> Result<MigrationConfig> {
    if let Some(path) = load_env_file(args.env_file.as_deref())? {
        debug!(path = %path.display(), "loaded environment file");
    }
    MigrationConfig::from_env().context("read configuration")
}

/// The reference year is only read from the clock here, never in the core crates.
fn identity_strategy(args: &SourceArgs, config: &MigrationConfig) -> IdentityStrategy {
    match &args.identity_column {
        Some(column) => IdentityStrategy::source_key(column.clone()),
        None => IdentityStrategy::age_anchored(
            config
                .reference_year
                .unwrap_or_else(|| chrono::Local::now().year()),
        ),
    }
}

fn duplicate_key(arg: DuplicateKeyArg, identity: IdentityStrategy) -> DuplicateKey {
    match arg {
        DuplicateKeyArg::Identity => DuplicateKey::Identity(identity),
        DuplicateKeyArg::NameAge => DuplicateKey::NameAge,
    }
}
