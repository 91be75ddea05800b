use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use metaddl::context::GenerationContext;
use metaddl::sql::{self, Dialect};
use metaddl::{output, summary};

#[derive(Parser)]
#[command(name = "metaddl")]
#[command(about = "Generate SQL DDL from table metadata JSON")]
#[command(version)]
struct Cli {
    /// Metadata JSON file
    input: PathBuf,

    /// Output directory
    #[arg(short, long, env = "METADDL_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Target dialect, overriding `database.type`: mysql, mariadb, postgresql, h2
    #[arg(short, long, env = "METADDL_DIALECT")]
    dialect: Option<Dialect>,

    /// Print a summary of the metadata and exit
    #[arg(long)]
    summary: bool,

    /// Print the combined script to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Also write the enriched metadata as JSON
    #[arg(long)]
    enriched: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // Everything is validated before the first file is touched.
    let document = metaddl::load(&source)
        .with_context(|| format!("Invalid metadata in {}", cli.input.display()))?;
    debug!(
        "loaded {} tables from {}",
        document.tables.len(),
        cli.input.display()
    );

    if cli.summary {
        print!("{}", summary::render(&document));
        return Ok(());
    }

    let mut ctx = GenerationContext::now(&document);
    if let Some(dialect) = cli.dialect {
        ctx = ctx.with_dialect(dialect);
    }
    info!("generating {} DDL", ctx.dialect);
    let artifacts = sql::emit(&document, &ctx);

    if cli.stdout {
        print!("{}", artifacts.combined);
        return Ok(());
    }

    let written = output::write_artifacts(&artifacts, &cli.output)?;
    for (kind, path) in &written {
        if !cli.quiet {
            println!("{:<24} {}", kind.file_name(), path.display());
        }
    }

    if cli.enriched {
        let path = output::write_enriched(&document, &cli.output)?;
        if !cli.quiet {
            println!("{:<24} {}", output::ENRICHED_FILE_NAME, path.display());
        }
    }

    Ok(())
}
