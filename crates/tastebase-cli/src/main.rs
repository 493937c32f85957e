mod logging;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use logging::{LogFormat, init_logging};
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::json;
use tastebase_core::{
    Category, Restaurant, RestaurantCategory, RestaurantImage, RestaurantLocation,
    RestaurantReviewStats, Review, ReviewPhoto, Settings, UserAccount, UserProfile,
    redact_connection_string,
};
use tastebase_generate::text::TextError;
use tastebase_generate::{
    GenerationError, TextService, generate_restaurants, generate_reviews, generate_users,
    text_service_from_settings,
};
use tastebase_load::{
    LoadError, LoadOptions, LoadReport, MemoryStore, PostgresStore, Store, load_all,
    load_restaurants, load_reviews, load_users,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Core(#[from] tastebase_core::Error),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("text service setup failed: {0}")]
    Text(#[from] TextError),
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("could not encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "tastebase", version, about = "Tastebase synthetic data generator and loader")]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Env file to read instead of `./.env`.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Artifact directory (overrides DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
    /// Also append JSON log lines to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write JSON artifacts for one entity group or all of them.
    Generate {
        #[arg(value_enum)]
        target: Target,
    },
    /// Load artifacts into Postgres.
    Load(LoadArgs),
    /// Create the tables and seed the categories.
    InitDb,
    /// Load every artifact into an in-memory store and print table counts.
    Verify,
    /// Print the JSON Schema of every artifact record.
    ArtifactSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Users,
    Restaurants,
    Reviews,
    All,
}

#[derive(Args, Debug)]
struct LoadArgs {
    #[arg(value_enum)]
    target: Target,
    /// Truncate the target tables before inserting.
    #[arg(long, default_value_t = false)]
    truncate: bool,
    /// Skip the stats rebuild after loading reviews.
    #[arg(long, default_value_t = false)]
    no_rebuild_stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref(), cli.env_file.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    match cli.command {
        Command::Generate { target } => run_generate(&settings, target).await,
        Command::Load(args) => {
            if args.truncate {
                settings.load_truncate = true;
            }
            if args.no_rebuild_stats {
                settings.rebuild_stats = false;
            }
            run_load(&settings, args.target).await
        }
        Command::InitDb => run_init_db(&settings).await,
        Command::Verify => run_verify(&settings).await,
        Command::ArtifactSchema => print_artifact_schemas(),
    }
}

async fn run_generate(settings: &Settings, target: Target) -> Result<(), CliError> {
    settings.validate()?;
    let service = text_service_from_settings(settings)?;
    let text = service.as_ref().map(|service| service as &dyn TextService);
    let now = Utc::now().naive_utc();
    info!(entity = ?target, data_dir = %settings.data_dir.display(), "generate started");

    let mut reports = Vec::new();
    if matches!(target, Target::Users | Target::All) {
        reports.push(generate_users(settings, now)?);
    }
    if matches!(target, Target::Restaurants | Target::All) {
        reports.push(generate_restaurants(settings, now, text).await?);
    }
    if matches!(target, Target::Reviews | Target::All) {
        reports.push(generate_reviews(settings, now, text).await?);
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

async fn connect(settings: &Settings) -> Result<PostgresStore, CliError> {
    let url = settings.require_database_url()?;
    info!(database = %redact_connection_string(url), "connecting");
    Ok(PostgresStore::connect(url).await?)
}

async fn run_load(settings: &Settings, target: Target) -> Result<(), CliError> {
    settings.validate()?;
    let options = LoadOptions::from_settings(settings);
    let mut store = connect(settings).await?;

    let report: LoadReport = match target {
        Target::Users => load_users(&mut store, &options).await?,
        Target::Restaurants => load_restaurants(&mut store, &options).await?,
        Target::Reviews => load_reviews(&mut store, &options).await?,
        Target::All => load_all(&mut store, &options).await?,
    };
    info!(
        unit = %report.target,
        chunks = report.chunks,
        skipped = report.skipped(),
        duration_ms = report.duration_ms,
        "load finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_init_db(settings: &Settings) -> Result<(), CliError> {
    let store = connect(settings).await?;
    store.apply_schema().await?;
    info!("schema applied");
    Ok(())
}

async fn run_verify(settings: &Settings) -> Result<(), CliError> {
    settings.validate()?;
    let options = LoadOptions {
        data_dir: settings.data_dir.clone(),
        truncate: false,
        rebuild_stats: true,
    };
    let mut store = MemoryStore::default();
    let report = load_all(&mut store, &options).await?;

    let counts: BTreeMap<String, u64> = store
        .table_counts()
        .await?
        .into_iter()
        .map(|(table, count)| (table.name().to_string(), count))
        .collect();
    let output = json!({
        "data_dir": settings.data_dir.display().to_string(),
        "chunks": report.chunks,
        "skipped": report.skipped(),
        "tables": counts,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_artifact_schemas() -> Result<(), CliError> {
    let schemas: BTreeMap<&str, RootSchema> = BTreeMap::from([
        ("category", schema_for!(Category)),
        ("restaurant", schema_for!(Restaurant)),
        ("restaurant_location", schema_for!(RestaurantLocation)),
        ("restaurant_image", schema_for!(RestaurantImage)),
        ("restaurant_category", schema_for!(RestaurantCategory)),
        ("user_account", schema_for!(UserAccount)),
        ("user_profile", schema_for!(UserProfile)),
        ("review", schema_for!(Review)),
        ("review_photo", schema_for!(ReviewPhoto)),
        ("restaurant_review_stats", schema_for!(RestaurantReviewStats)),
    ]);
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn load_flags_parse_after_the_target() {
        let cli = Cli::try_parse_from([
            "tastebase",
            "--data-dir",
            "/tmp/tb",
            "load",
            "reviews",
            "--truncate",
            "--no-rebuild-stats",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tb")));
        match cli.command {
            Command::Load(args) => {
                assert_eq!(args.target, Target::Reviews);
                assert!(args.truncate);
                assert!(args.no_rebuild_stats);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["tastebase", "generate", "all", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Generate { target: Target::All }));
    }
}
