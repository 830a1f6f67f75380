//! xmlmelt: Decompose nested XML into relational tables
//!
//! Usage:
//!   # Show the extracted table descriptors as JSON lines
//!   xmlmelt describe devices.xml
//!
//!   # Print the CREATE TABLE statements for a document read from stdin
//!   cat devices.xml | xmlmelt schema --strategy flat
//!
//!   # Create the schema and load the rows into a SQLite database
//!   xmlmelt load devices.xml --db devices.db

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xmlmelt::melt::ReservedWords;
use xmlmelt::{melt_xml, Document, MeltConfig, SqliteStore, StrategyKind};

#[derive(Parser, Debug)]
#[command(name = "xmlmelt")]
#[command(about = "Decompose nested XML into relational tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table descriptors as newline-delimited JSON
    Describe(InputArgs),

    /// Print the CREATE TABLE statements
    Schema(InputArgs),

    /// Create the schema and insert the rows into a SQLite database
    Load {
        #[command(flatten)]
        input: InputArgs,

        /// SQLite database file (created if missing)
        #[arg(long)]
        db: PathBuf,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input XML file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Linkage strategy: hierarchical or flat
    #[arg(long, default_value_t = StrategyKind::Hierarchical)]
    strategy: StrategyKind,

    /// Comma-separated words to escape instead of the default reserved set
    #[arg(long)]
    reserved_words: Option<String>,
}

impl InputArgs {
    fn config(&self) -> MeltConfig {
        let mut config = MeltConfig {
            strategy: self.strategy,
            ..MeltConfig::default()
        };
        if let Some(words) = &self.reserved_words {
            config.reserved_words = ReservedWords::new(words.split(','));
        }
        config
    }

    fn read_input(&self) -> Result<String> {
        let mut reader = if let Some(path) = &self.input {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Box::new(BufReader::new(file)) as Box<dyn Read>
        } else {
            Box::new(std::io::stdin()) as Box<dyn Read>
        };

        let mut xml = String::new();
        reader
            .read_to_string(&mut xml)
            .context("Failed to read XML input")?;
        Ok(xml)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Describe(input) => describe(&input),
        Command::Schema(input) => schema(&input),
        Command::Load { input, db } => load(&input, db),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn describe(input: &InputArgs) -> Result<()> {
    let config = input.config();
    let document = Document::parse(&input.read_input()?).context("Failed to parse XML")?;
    let descriptors = config.strategy.build(&config).extract(&document)?;

    let mut stdout = std::io::stdout().lock();
    for descriptor in &descriptors {
        let line = serde_json::to_string(descriptor).context("Failed to serialize descriptor")?;
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}

fn schema(input: &InputArgs) -> Result<()> {
    let config = input.config();
    let document = Document::parse(&input.read_input()?).context("Failed to parse XML")?;
    let strategy = config.strategy.build(&config);
    let descriptors = strategy.extract(&document)?;

    let mut stdout = std::io::stdout().lock();
    for spec in strategy.build_schema(&descriptors) {
        writeln!(stdout, "{}", spec)?;
    }
    Ok(())
}

fn load(input: &InputArgs, db: PathBuf) -> Result<()> {
    let config = input.config();
    let xml = input.read_input()?;
    let mut store = SqliteStore::open(&db)
        .with_context(|| format!("Failed to open database: {}", db.display()))?;

    let summary = melt_xml(&xml, &config, &mut store)
        .with_context(|| format!("Failed to load XML into {}", db.display()))?;

    info!(
        db = %db.display(),
        tables = summary.tables,
        rows = summary.rows,
        "load complete"
    );
    Ok(())
}
