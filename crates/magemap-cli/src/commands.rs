//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use magemap_core::{module_dir_for, ExtractorConfig, ModuleSource};
use magemap_graph::{
    DependencyHop, GraphBuilder, GraphMetadata, GraphStore, ModuleDependencies, SnapshotDir,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const CONFIG_DIR: &str = ".magemap";
const CONFIG_FILE: &str = "config.json";

/// Where `init` writes the extractor config for `path`.
fn config_path(path: &Path) -> PathBuf {
    path.join(CONFIG_DIR).join(CONFIG_FILE)
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

fn load_config(explicit: Option<&Path>) -> Result<ExtractorConfig> {
    let config = match explicit {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::load_or_default(&config_path(Path::new(".")))?,
    };
    debug!("Extractor areas: {}", config.areas.join(", "));
    Ok(config)
}

fn load_graph(explicit: Option<&Path>, hint: Option<&str>, data_dir: &Path) -> Result<GraphStore> {
    let path = SnapshotDir::new(data_dir).find(explicit, hint).map_err(|e| {
        format!(
            "{}\n  Run {} first",
            e,
            "mage-map parse <ModuleName>".cyan()
        )
    })?;

    println!("{} {}", "Graph:".dimmed(), path.display());
    Ok(SnapshotDir::load(&path)?)
}

/// Write a default extractor config.
pub fn init(path: &Path) -> Result<()> {
    let config_file = config_path(path);

    if config_file.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path.join(CONFIG_DIR))?;
    fs::write(
        &config_file,
        serde_json::to_string_pretty(&ExtractorConfig::default())?,
    )?;

    println!("{} Initialized Mage Map in {}", "✓".green(), path.display());
    println!("  Run {} to build a graph", "mage-map parse <ModuleName>".cyan());

    Ok(())
}

/// Creation time for a new graph.
///
/// An explicit RFC 3339 time wins over `SOURCE_DATE_EPOCH`; with neither,
/// the clock is read once here.
pub fn graph_metadata(
    created: Option<&str>,
    source_date_epoch: Option<i64>,
) -> Result<GraphMetadata> {
    let metadata = match (created, source_date_epoch) {
        (Some(created), _) => GraphMetadata::parse(created)?,
        (None, Some(seconds)) => GraphMetadata::from_unix_seconds(seconds)?,
        (None, None) => GraphMetadata::now(),
    };
    debug!("Graph creation time: {}", metadata.created);
    Ok(metadata)
}

/// Parse one module and save its graph.
pub fn parse(
    module: &str,
    vendor_dir: &Path,
    output: &Path,
    config: Option<&Path>,
    metadata: GraphMetadata,
) -> Result<()> {
    let config = load_config(config)?;
    let module_dir = module_dir_for(vendor_dir, module);
    let start = Instant::now();

    println!("{} {}", "Parsing".cyan(), module.bold());
    println!("{} {}", "Path:".dimmed(), module_dir.display());

    let stage = spinner("Parsing di.xml, events.xml and module.xml...")?;
    let source = ModuleSource::scan(&module_dir, &config);
    stage.finish_and_clear();
    let source = source?;

    let di_stats = source.di.stats();
    println!(
        "{} di.xml: {} preferences, {} plugins, {} virtual types, {} types",
        "✓".green(),
        di_stats.preferences.to_string().cyan(),
        di_stats.plugins.to_string().cyan(),
        di_stats.virtual_types.to_string().cyan(),
        di_stats.type_configs.to_string().cyan()
    );
    let events_stats = source.events.stats();
    println!(
        "{} events.xml: {} events, {} observers",
        "✓".green(),
        events_stats.events.to_string().cyan(),
        events_stats.observers.to_string().cyan()
    );
    let module_stats = source.modules.stats();
    println!(
        "{} module.xml: {} module(s), {} dependencies",
        "✓".green(),
        module_stats.modules.to_string().cyan(),
        module_stats.total_dependencies.to_string().cyan()
    );

    let stage = spinner("Building graph...")?;
    let mut builder = GraphBuilder::new(metadata).default_area(config.global_area.as_str());
    builder.add_source(&source);
    let graph = builder.finish();
    let saved = SnapshotDir::open(output).and_then(|dir| dir.save(module, &graph));
    stage.finish_and_clear();
    let saved = saved?;

    println!(
        "{} Built graph with {} nodes and {} edges in {}ms",
        "✓".green(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        start.elapsed().as_millis()
    );
    println!("{} Saved to {}", "✓".green(), saved.display());

    Ok(())
}

/// List plugins intercepting a target.
pub fn plugins(
    target: &str,
    area: Option<&str>,
    show_order: bool,
    graph_file: Option<&Path>,
    data_dir: &Path,
) -> Result<()> {
    println!("{} {}", "Target:".dimmed(), target);
    let graph = load_graph(graph_file, Some(target), data_dir)?;
    let plugins = graph.plugins_for(target, area);

    if plugins.is_empty() {
        println!("{} {}", "No plugins found for".yellow(), target.bold());
        return Ok(());
    }

    println!();
    for plugin in &plugins {
        println!(
            "  {} {}",
            plugin.name.bold(),
            format!("[sortOrder {}]", plugin.sort_order).yellow()
        );
        if let Some(class) = &plugin.class {
            println!("    {}", class.dimmed());
        }
        println!(
            "    method: {}  area: {}",
            plugin.method.as_deref().unwrap_or("all"),
            plugin.area.cyan()
        );
    }
    println!();
    println!("{} Found {} plugin(s)", "✓".green(), plugins.len());

    if show_order && plugins.len() > 1 {
        println!("\n{}", "Execution order:".cyan());
        for (i, plugin) in plugins.iter().enumerate() {
            println!(
                "  {}. {} {}",
                (i + 1).to_string().yellow(),
                plugin.name,
                format!("(sortOrder: {})", plugin.sort_order).dimmed()
            );
        }
    }

    Ok(())
}

/// List observers of an event.
pub fn observers(
    event: &str,
    area: Option<&str>,
    graph_file: Option<&Path>,
    data_dir: &Path,
) -> Result<()> {
    println!("{} {}", "Event:".dimmed(), event);
    let graph = load_graph(graph_file, None, data_dir)?;
    let observers = graph.observers_for(event, area);

    if observers.is_empty() {
        println!("{} {}", "No observers found for".yellow(), event.bold());
        return Ok(());
    }

    println!();
    for observer in &observers {
        println!("  {} {}", observer.name.bold(), format!("[{}]", observer.area).cyan());
        if let Some(class) = &observer.class {
            println!("    {}::{}", class.dimmed(), observer.method);
        }
    }
    println!();
    println!("{} Found {} observer(s)", "✓".green(), observers.len());

    Ok(())
}

fn print_hops(hops: &[DependencyHop]) {
    for hop in hops {
        println!("  {} {}", hop.module, format!("({} hop(s))", hop.hops).dimmed());
    }
}

/// Show load-order dependencies of a module.
pub fn deps(
    module: &str,
    transitive: bool,
    reverse: bool,
    graph_file: Option<&Path>,
    data_dir: &Path,
) -> Result<()> {
    let graph = load_graph(graph_file, None, data_dir)?;
    let deps = ModuleDependencies::from_store(&graph);

    let label = if reverse { "Dependents of" } else { "Dependencies of" };
    println!("\n{} {}", label.cyan(), module.bold());

    let count = match (transitive, reverse) {
        (false, false) => print_names(&deps.direct(module)?),
        (false, true) => print_names(&deps.dependents(module)?),
        (true, false) => {
            let hops = deps.transitive(module)?;
            print_hops(&hops);
            hops.len()
        }
        (true, true) => {
            let hops = deps.transitive_dependents(module)?;
            print_hops(&hops);
            hops.len()
        }
    };

    if count == 0 {
        println!("  {}", "none".dimmed());
    }
    Ok(())
}

fn print_names(names: &[String]) -> usize {
    for name in names {
        println!("  {}", name);
    }
    names.len()
}

/// Show graph statistics.
pub fn stats(graph_file: Option<&Path>, data_dir: &Path) -> Result<()> {
    let graph = load_graph(graph_file, None, data_dir)?;
    let stats = graph.stats();
    let metadata = graph.metadata();

    println!();
    println!("{}", "Graph".cyan());
    println!("  Created: {}", metadata.created);
    println!("  Version: {}", metadata.version);
    println!("  Nodes:   {}", stats.total_nodes.to_string().cyan());
    println!("  Edges:   {}", stats.total_edges.to_string().cyan());

    println!("\n{}", "Node types".cyan());
    for (kind, count) in &stats.node_types {
        println!("  {:<12} {}", kind.to_string(), count);
    }

    println!("\n{}", "Edge types".cyan());
    for (kind, count) in &stats.edge_types {
        println!("  {:<16} {}", kind.to_string(), count);
    }

    Ok(())
}
