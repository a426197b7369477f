use clap::{Parser, Subcommand};
use std::{error::Error, path::PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod envelope;
mod error;
mod mapping;
mod pipeline;
mod records;
mod schema;

use config::{
    parse_delimiter, NumericMode, PipelineConfig, PipelineKind, DEFAULT_ENTRIES_INPUT,
    DEFAULT_ENTRIES_OUTPUT, DEFAULT_PRODUCTS_INPUT, DEFAULT_PRODUCTS_OUTPUT,
};
use pipeline::{run, run_linked, RunSummary};

/// Convert semicolon-delimited CSV exports into bulk-import JSON record batches
#[derive(Parser, Debug)]
#[command(name = "sfdx-records", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Field delimiter of the input files
    #[arg(long, global = true, default_value = ";", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Fail on unparseable numbers instead of writing 0.0
    #[arg(long, global = true)]
    strict: bool,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert product rows into Product2 records
    Products {
        /// CSV file to read
        #[arg(short, long, default_value = DEFAULT_PRODUCTS_INPUT)]
        input: PathBuf,

        /// JSON file to write
        #[arg(short, long, default_value = DEFAULT_PRODUCTS_OUTPUT)]
        output: PathBuf,
    },

    /// Convert price book entry rows into PricebookEntry records
    PricebookEntries {
        /// CSV file to read
        #[arg(short, long, default_value = DEFAULT_ENTRIES_INPUT)]
        input: PathBuf,

        /// JSON file to write
        #[arg(short, long, default_value = DEFAULT_ENTRIES_OUTPUT)]
        output: PathBuf,

        /// Id of the price book every entry belongs to
        #[arg(long)]
        pricebook_id: String,
    },

    /// Convert both files, checking that every entry has a matching product
    Link {
        #[arg(long, default_value = DEFAULT_PRODUCTS_INPUT)]
        products_input: PathBuf,

        #[arg(long, default_value = DEFAULT_PRODUCTS_OUTPUT)]
        products_output: PathBuf,

        #[arg(long, default_value = DEFAULT_ENTRIES_INPUT)]
        entries_input: PathBuf,

        #[arg(long, default_value = DEFAULT_ENTRIES_OUTPUT)]
        entries_output: PathBuf,

        /// Id of the price book every entry belongs to
        #[arg(long)]
        pricebook_id: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let numeric_mode = if cli.strict {
        NumericMode::Strict
    } else {
        NumericMode::Lenient
    };
    let configure = |input: PathBuf, output: PathBuf| {
        PipelineConfig::new(input, output)
            .with_delimiter(cli.delimiter)
            .with_numeric_mode(numeric_mode)
    };

    match cli.command {
        Command::Products { input, output } => {
            let summary = run(&configure(input, output), &PipelineKind::Products)?;
            report("products", &summary);
        }
        Command::PricebookEntries {
            input,
            output,
            pricebook_id,
        } => {
            let summary = run(
                &configure(input, output),
                &PipelineKind::PricebookEntries { pricebook_id },
            )?;
            report("pricebook entries", &summary);
        }
        Command::Link {
            products_input,
            products_output,
            entries_input,
            entries_output,
            pricebook_id,
        } => {
            let summary = run_linked(
                &configure(products_input, products_output),
                &configure(entries_input, entries_output),
                &pricebook_id,
            )?;
            report("products", &summary.products);
            report("pricebook entries", &summary.entries);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn report(what: &str, summary: &RunSummary) {
    println!(
        "{} {} written to {}",
        summary.records,
        what,
        summary.output.display()
    );
}
