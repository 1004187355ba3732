//! tabload CLI
//!
//! Loads JSON tables and element trees into SQLite, or prints the SQL a
//! load would run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tabload_core::prelude::*;
use tabload_sqlite::SqliteExecutor;

/// Batched SQL loading for tabular and tree-shaped data.
#[derive(Parser)]
#[command(name = "tabload")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:tabload.db")]
    database: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a JSON table into the database.
    Load {
        /// JSON file: an array of rows or an array of objects.
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Print the statements a load would execute.
    Sql {
        /// JSON file: an array of rows or an array of objects.
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Flatten a JSON element tree into rows.
    Flatten {
        /// JSON file holding the root element.
        #[arg(short, long)]
        input: PathBuf,

        /// Tag allowed to repeat within one row (repeatable).
        #[arg(long = "duplicate-tag")]
        duplicate_tags: Vec<String>,

        /// Capture attributes of elements without text.
        #[arg(long)]
        with_attributes: bool,

        /// Keep elements instead of their text.
        #[arg(long)]
        with_element: bool,

        /// Insert the rows into this table instead of printing them.
        #[arg(long, value_name = "TABLE")]
        load_into: Option<String>,

        /// Create the `--load-into` table from the rows if it does not exist.
        #[arg(long, requires = "load_into")]
        create: bool,
    },
}

/// Write settings. Flags override the configuration file.
#[derive(Args, Debug, Default)]
struct WriteArgs {
    /// JSON file with write options.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target table, optionally `schema.table`.
    #[arg(short, long)]
    table: Option<String>,

    /// insert, replace or upsert.
    #[arg(short, long)]
    mode: Option<WriteMode>,

    /// Conflict key field (repeatable); required for upsert.
    #[arg(short = 'k', long = "conflict-key")]
    conflict_key: Vec<String>,

    /// Rows per batch.
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Commit once after the last batch only.
    #[arg(long)]
    no_commit_per_batch: bool,

    /// The first row holds data, not field names.
    #[arg(long)]
    no_header: bool,

    /// generic, mysql or sqlite.
    #[arg(long)]
    dialect: Option<DialectKind>,

    /// reference or literal.
    #[arg(long)]
    update_strategy: Option<UpdateStrategy>,

    /// Empty the table before writing.
    #[arg(long)]
    truncate: bool,

    /// Create the table from the data if it does not exist.
    #[arg(long)]
    create: bool,
}

impl WriteArgs {
    fn to_options(&self) -> anyhow::Result<WriteOptions> {
        let mut options = match &self.config {
            Some(path) => WriteOptions::from_path(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None => WriteOptions::default(),
        };

        if let Some(table) = &self.table {
            options.table_name.clone_from(table);
        }
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if !self.conflict_key.is_empty() {
            options.conflict_key.clone_from(&self.conflict_key);
        }
        if let Some(batch_size) = self.batch_size {
            options.batch = BatchSpec::new(batch_size, options.batch.commit_per_batch)?;
        }
        if self.no_commit_per_batch {
            options.batch.commit_per_batch = false;
        }
        if self.no_header {
            options.with_header = false;
        }
        if let Some(dialect) = self.dialect {
            options.dialect = dialect;
        }
        if let Some(strategy) = self.update_strategy {
            options.update_strategy = strategy;
        }
        if self.truncate {
            options.truncate_first = true;
        }
        if self.create {
            options.create_table = true;
        }
        Ok(options)
    }
}

fn read_input(path: &Path) -> anyhow::Result<TabularInput> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(TabularInput::from_json(value)?)
}

/// The executor is SQLite, so loads always use the SQLite dialect.
fn sqlite_options(mut options: WriteOptions) -> WriteOptions {
    if options.dialect != DialectKind::Sqlite {
        if options.dialect != DialectKind::Generic {
            warn!(
                dialect = %options.dialect,
                "Ignoring configured dialect, loading with sqlite"
            );
        }
        options.dialect = DialectKind::Sqlite;
    }
    options
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Load { input, write } => {
            let options = sqlite_options(write.to_options()?);
            let input = read_input(&input)?;
            let mut executor = SqliteExecutor::connect(&cli.database)?;
            let affected = load(&mut executor, input, options)?;
            executor.close()?;
            info!(affected, "Load finished");
        }

        Commands::Sql { input, write } => {
            let writer = make_writer(write.to_options()?, read_input(&input)?)?;
            let statements = writer.statements().into_vec();
            for sql in writer.create_statement().into_iter().chain(statements) {
                println!("{sql};");
            }
        }

        Commands::Flatten {
            input,
            duplicate_tags,
            with_attributes,
            with_element,
            load_into,
            create,
        } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let root = Element::from_json_str(&json)?;
            let options = FlattenOptions {
                duplicate_tags: duplicate_tags.into_iter().collect(),
                with_attributes,
                with_element,
            };
            let rows = DfsExpansion::new(options).flatten(&root)?;

            match load_into {
                Some(table) => {
                    let records: Vec<Record> = rows.iter().map(FlattenedRow::to_record).collect();
                    let options = WriteOptions::new(table)
                        .dialect(DialectKind::Sqlite)
                        .create_table(create);
                    let mut executor = SqliteExecutor::connect(&cli.database)?;
                    let affected = load(&mut executor, records.into(), options)?;
                    executor.close()?;
                    info!(rows = rows.len(), affected, "Flattened rows loaded");
                }
                None => {
                    for row in &rows {
                        println!("{}", serde_json::Value::Object(row.to_json()));
                    }
                }
            }
        }
    }

    Ok(())
}
