//! Order history CLI.
//!
//! Commands:
//! - `generate`: write the full lifecycle-record stream to a file or stdout
//! - `config`: print the effective configuration as JSON

mod logging;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use order_history_gen::{
    CsvSink, GeneratorConfig, HistoryGenerator, JsonLinesSink, RecordSink, SqlSink, TableSink,
};

#[derive(Parser)]
#[command(
    name = "order-history",
    about = "Deterministic trade-order lifecycle history generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate lifecycle records.
    Generate {
        /// Path to a JSON config file. Built-in defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the configured number of orders.
        #[arg(long)]
        orders: Option<u64>,

        /// Override the configured log level.
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Print the effective configuration as JSON.
    Config {
        /// Path to a JSON config file. Built-in defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured number of orders.
        #[arg(long)]
        orders: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Jsonl,
    Sql,
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            config,
            format,
            output,
            orders,
            log_level,
        } => cmd_generate(config.as_deref(), format, output.as_deref(), orders, log_level.as_deref()),
        Commands::Config { config, orders } => cmd_config(config.as_deref(), orders),
    }
}

fn load_config(path: Option<&Path>, orders: Option<u64>) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(p) => GeneratorConfig::load(p)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(n) = orders {
        config.total_orders = n;
    }
    config.validate()?;
    Ok(config)
}

fn config_summary(path: Option<&Path>, config: &GeneratorConfig) -> String {
    let source = path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    format!(
        "config loaded source={} total_orders={} segments={}/{}/{}",
        source,
        config.total_orders,
        config.segments.created_before_recording,
        config.segments.created_and_done,
        config.segments.completed_after_recording
    )
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn sink_for(format: OutputFormat, out: Box<dyn Write>) -> Box<dyn RecordSink> {
    match format {
        OutputFormat::Csv => Box::new(CsvSink::new(out)),
        OutputFormat::Jsonl => Box::new(JsonLinesSink::new(out)),
        OutputFormat::Sql => Box::new(SqlSink::new(out)),
        OutputFormat::Table => Box::new(TableSink::new(out)),
    }
}

fn cmd_generate(
    config_path: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
    orders: Option<u64>,
    log_level: Option<&str>,
) -> Result<()> {
    // logger settings come from the loaded config
    let config = load_config(config_path, orders)?;
    logging::init(&config.logging, log_level)?;
    info!("{}", config_summary(config_path, &config));

    let mut generator = HistoryGenerator::new(&config)?;
    let mut sink = sink_for(format, open_output(output)?);
    let written = generator
        .write_all(&mut sink)
        .context("writing lifecycle records")?;

    if let Some(p) = output {
        eprintln!("wrote {} records to {}", written, p.display());
    }
    Ok(())
}

fn cmd_config(config_path: Option<&Path>, orders: Option<u64>) -> Result<()> {
    let config = load_config(config_path, orders)?;
    println!("{}", config.to_json()?);
    Ok(())
}
