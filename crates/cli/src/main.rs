use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use command::bench::{BenchOptions, ReportFormat};
use config::AppConfig;
use std::path::PathBuf;

mod command;
mod config;
mod web;

#[derive(Parser)]
#[command(name = "vana")]
#[command(about = "Tiered memory/vector/web search coordination", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: $VANA_CONFIG, then ./vana.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a query and print the routing decision
    Classify(ClassifyArgs),

    /// Run a coordinated search and print the JSON response
    Search(SearchArgs),

    /// Benchmark coordinated search and print a coordination report
    Bench(BenchArgs),

    /// Print the JSON schema of the search response
    Schema,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Query text
    query: String,
}

#[derive(Args)]
struct SearchArgs {
    /// Query text
    query: String,

    /// Results requested from each tier (default: search.default_max_results)
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Skip memory and vector and search the web directly
    #[arg(long)]
    force_web: bool,
}

#[derive(Args)]
struct BenchArgs {
    /// Dataset JSON (default: built-in queries)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Repeat the dataset this many times (default: bench.iterations)
    #[arg(long)]
    iterations: Option<usize>,

    /// Tests launched per concurrent batch (default: bench.concurrency)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Classify(args) => command::search::run_classify(&args.query)?,
        Commands::Schema => command::search::run_schema()?,
        Commands::Search(args) => {
            let config = AppConfig::load(cli.config.as_deref())?;
            command::search::run_search(&config, &args.query, args.max_results, args.force_web)
                .await?;
        }
        Commands::Bench(args) => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let opts = BenchOptions {
                dataset: args.dataset,
                iterations: args.iterations,
                concurrency: args.concurrency,
                format: args.format,
                out: args.out,
            };
            command::bench::run_bench(&config, opts).await?;
        }
    }

    Ok(())
}
