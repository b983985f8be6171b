//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use formfill_core::editor::Editor;
use formfill_core::fill::{FillReport, LocalPageChannel, fill_after_save};
use formfill_core::import::import_csv_file;
use formfill_core::store::FormDataStore;
use formfill_shared::{AppConfig, DateOrder, FORM_DATA_KEY, init_config, load_config};
use formfill_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// formfill: keep your form answers in one place and fill forms with them.
#[derive(Parser)]
#[command(
    name = "formfill",
    version,
    about = "Import, edit and auto-fill form answers from a local key/value store.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Database file (overrides `[storage] db_path`).
    #[arg(long, env = "FORMFILL_DB", global = true)]
    pub db: Option<PathBuf>,

    /// How `D/M/YYYY` answers are read: day-first or month-first.
    #[arg(long, global = true)]
    pub date_order: Option<DateOrder>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show every stored entry.
    List {
        /// Print the raw JSON object instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Add an entry or change its value.
    Set {
        key: String,
        value: String,
    },

    /// Delete an entry.
    Remove {
        key: String,
    },

    /// Import key/value pairs from a two-column CSV file.
    Import {
        /// CSV file: one `key,value` pair per line.
        file: PathBuf,

        /// Replace values of keys that already exist.
        #[arg(long, conflicts_with = "keep_existing")]
        overwrite: bool,

        /// Keep values of keys that already exist.
        #[arg(long)]
        keep_existing: bool,
    },

    /// Fill a saved form page with the stored entries.
    Fill {
        /// HTML snapshot of the form page.
        page: PathBuf,

        /// Where to write the fill report (defaults to `<page>.fill.json`).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "formfill=info",
        1 => "formfill=debug",
        _ => "formfill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config()?;
    apply_overrides(&mut config, &cli);

    match cli.command {
        Command::List { json } => cmd_list(&config, json).await,
        Command::Set { key, value } => cmd_set(&config, &key, &value).await,
        Command::Remove { key } => cmd_remove(&config, &key).await,
        Command::Import {
            file,
            overwrite,
            keep_existing,
        } => {
            let overwrite = match (overwrite, keep_existing) {
                (true, _) => true,
                (_, true) => false,
                _ => config.defaults.overwrite_existing,
            };
            cmd_import(&config, &file, overwrite).await
        }
        Command::Fill { page, out } => cmd_fill(&config, &page, out.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(db) = &cli.db {
        config.storage.db_path = db.to_string_lossy().into_owned();
    }
    if let Some(order) = cli.date_order {
        config.fill.date_order = order;
    }
}

async fn open_storage(config: &AppConfig) -> Result<Storage> {
    let path = config.db_path()?;
    Ok(Storage::open(&path).await?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list(config: &AppConfig, json: bool) -> Result<()> {
    let storage = open_storage(config).await?;
    let data = storage.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if data.is_empty() {
        println!("No saved entries.");
        return Ok(());
    }

    let width = data.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    println!();
    for (key, value) in data.iter() {
        println!("  {key:<width$}  {value}");
    }
    println!();
    if let Some(entry) = storage.get_entry(FORM_DATA_KEY).await? {
        println!(
            "  {} entries, last saved {}",
            data.len(),
            entry.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!();
    }
    Ok(())
}

async fn cmd_set(config: &AppConfig, key: &str, value: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() || value.trim().is_empty() {
        return Err(eyre!("key and value must not be empty"));
    }

    let storage = open_storage(config).await?;
    let mut editor = Editor::open(&storage).await?;
    match editor.table().position(key) {
        Some(row) => {
            editor.set_value(row, value).await?;
        }
        None => {
            let row = editor.add_row();
            editor.set_key(row, key).await?;
            editor.set_value(row, value).await?;
        }
    }
    info!(key, "entry saved");
    println!("Saved '{key}'");

    fill_after_save(&storage, &config.fill).await;
    Ok(())
}

async fn cmd_remove(config: &AppConfig, key: &str) -> Result<()> {
    let storage = open_storage(config).await?;
    let mut editor = Editor::open(&storage).await?;
    let row = editor
        .table()
        .position(key)
        .ok_or_else(|| eyre!("no entry named '{key}'"))?;
    editor.remove_row(row).await?;
    info!(key, "entry removed");
    println!("Removed '{key}'");

    fill_after_save(&storage, &config.fill).await;
    Ok(())
}

async fn cmd_import(config: &AppConfig, file: &Path, overwrite: bool) -> Result<()> {
    let storage = open_storage(config).await?;
    let outcome = import_csv_file(&storage, file, overwrite).await;
    if !outcome.success {
        return Err(eyre!("{}", outcome.message));
    }

    println!("{}", outcome.message);
    println!("  Stored entries: {}", outcome.data.len());

    fill_after_save(&storage, &config.fill).await;
    Ok(())
}

async fn cmd_fill(config: &AppConfig, page: &Path, out: Option<&Path>) -> Result<()> {
    let storage = open_storage(config).await?;
    let mut channel = LocalPageChannel::new(page, &storage, config.fill.date_order);
    if let Some(out) = out {
        channel = channel.with_report_path(out);
    }

    let report = channel.fill().await?;
    print_report(&report);
    println!("  Report: {}", channel.report_path().display());
    println!();
    Ok(())
}

fn print_report(report: &FillReport) {
    println!();
    println!("  {}", report.status());
    for field in &report.filled {
        println!("    {} [{}] = {}", field.question, field.kind, field.value);
    }
    if !report.unmatched.is_empty() {
        println!("  No saved answer: {}", report.unmatched.join(", "));
    }
    if !report.unsupported.is_empty() {
        println!("  Unsupported control: {}", report.unsupported.join(", "));
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
