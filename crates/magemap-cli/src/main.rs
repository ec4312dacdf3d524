//! Mage Map CLI - Command-line interface for Mage Map
//!
//! Parses a module's configuration into a graph file and answers
//! questions about plugins, observers and module dependencies from it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "mage-map")]
#[command(author = "Mage Map Contributors")]
#[command(version)]
#[command(about = "Map plugins, observers and preferences of a Magento codebase", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default extractor config to .magemap/config.json
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Parse a module and save its graph
    Parse {
        /// Module name, e.g. Magento_Customer
        #[arg(default_value = "Magento_Customer")]
        module: String,

        /// Vendor directory containing module-* packages
        #[arg(short, long, env = "MAGENTO_PATH", default_value = "./vendor/magento")]
        path: PathBuf,

        /// Directory the graph file is written to
        #[arg(short, long, default_value = "./data")]
        output: PathBuf,

        /// Extractor config file (defaults to .magemap/config.json when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Creation time recorded in the graph, as RFC 3339 (defaults to now)
        #[arg(long)]
        created: Option<String>,

        /// Creation time as Unix seconds, used when --created is absent
        #[arg(long, env = "SOURCE_DATE_EPOCH")]
        source_date_epoch: Option<i64>,
    },

    /// List plugins intercepting a class or interface
    Plugins {
        /// Fully qualified class or interface name
        target: String,

        /// Only plugins configured for this area
        #[arg(short, long, default_value = "all")]
        area: String,

        /// Do not print the execution order
        #[arg(long = "no-sort-order", action = clap::ArgAction::SetFalse)]
        sort_order: bool,

        /// Graph file to query (defaults to a search of the data directory)
        #[arg(short, long)]
        graph_file: Option<PathBuf>,

        /// Directory searched for graph files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// List observers of an event
    Observers {
        /// Event name, e.g. customer_save_after
        event: String,

        /// Only observers configured for this area
        #[arg(short, long, default_value = "all")]
        area: String,

        /// Graph file to query (defaults to a search of the data directory)
        #[arg(short, long)]
        graph_file: Option<PathBuf>,

        /// Directory searched for graph files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Show module load-order dependencies
    Deps {
        /// Module name, e.g. Magento_Customer
        module: String,

        /// Follow dependencies of dependencies
        #[arg(short, long)]
        transitive: bool,

        /// Show modules that depend on this one instead
        #[arg(short, long)]
        reverse: bool,

        /// Graph file to query (defaults to a search of the data directory)
        #[arg(short, long)]
        graph_file: Option<PathBuf>,

        /// Directory searched for graph files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Show node and edge counts of a graph file
    Stats {
        /// Graph file to inspect (defaults to a search of the data directory)
        #[arg(short, long)]
        graph_file: Option<PathBuf>,

        /// Directory searched for graph files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

/// `all` means no area filter.
fn area_filter(area: &str) -> Option<&str> {
    if area.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(area)
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Parse {
            module,
            path,
            output,
            config,
            created,
            source_date_epoch,
        } => commands::graph_metadata(created.as_deref(), source_date_epoch).and_then(|metadata| {
            commands::parse(&module, &path, &output, config.as_deref(), metadata)
        }),
        Commands::Plugins {
            target,
            area,
            sort_order,
            graph_file,
            data_dir,
        } => commands::plugins(
            &target,
            area_filter(&area),
            sort_order,
            graph_file.as_deref(),
            &data_dir,
        ),
        Commands::Observers {
            event,
            area,
            graph_file,
            data_dir,
        } => commands::observers(&event, area_filter(&area), graph_file.as_deref(), &data_dir),
        Commands::Deps {
            module,
            transitive,
            reverse,
            graph_file,
            data_dir,
        } => commands::deps(&module, transitive, reverse, graph_file.as_deref(), &data_dir),
        Commands::Stats {
            graph_file,
            data_dir,
        } => commands::stats(graph_file.as_deref(), &data_dir),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
