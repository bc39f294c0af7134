//! Scentmap CLI: render perfume networks offline or from a backend.
//!
//! Usage:
//!   scentmap render --dataset network.json [--accords Woody,Citrus] [--limit 10]
//!   scentmap neighbors --dataset network.json --id 1042
//!   scentmap detail --dataset network.json (--perfume 1042 | --accord Woody)
//!   scentmap validate --dataset network.json
//!   scentmap fetch --output network.json [--member-id 7]
//!   scentmap session [--member-id 7] [--reset]

use clap::{Args, Parser, Subcommand};
use scentmap::client::{load_dataset, FetchCoordinator, HttpBackend, NetworkQuery};
use scentmap::config::{default_config_path, snap_min_similarity, Config};
use scentmap::detail::{accord_detail, perfume_detail};
use scentmap::labels::derive_my_perfume_filters;
use scentmap::pipeline::top_similar;
use scentmap::session::ScorerOptions;
use scentmap::storage::SESSION_ID_KEY;
use scentmap::{
    render, Dataset, DatasetStore, EdgeKind, FilterState, NodeId, OpenStore, SessionScorer,
    SessionStorage, SqliteStorage,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "scentmap",
    version,
    about = "Perfume similarity network renderer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the bounded subgraph for a filter state
    Render {
        /// Dataset JSON file ({nodes, edges, meta})
        #[arg(long)]
        dataset: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// Write the render graph here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the most similar perfumes for a perfume
    Neighbors {
        #[arg(long)]
        dataset: PathBuf,
        /// Perfume node id
        #[arg(long)]
        id: String,
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Show the detail panel for a perfume or an accord
    Detail {
        #[arg(long)]
        dataset: PathBuf,
        /// Perfume node id
        #[arg(long, conflicts_with = "accord", required_unless_present = "accord")]
        perfume: Option<String>,
        /// Accord name
        #[arg(long)]
        accord: Option<String>,
        /// Selected accords to match against (comma separated)
        #[arg(long, value_delimiter = ',')]
        accords: Vec<String>,
    },
    /// Report data-integrity problems in a dataset
    Validate {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Download the full dataset from the backend
    Fetch {
        /// Destination JSON file
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        member_id: Option<i64>,
        /// Overrides api.base_url from the config
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Start or resume the activity session and print its state
    Session {
        #[arg(long)]
        member_id: Option<i64>,
        #[arg(long)]
        base_url: Option<String>,
        /// Forget the stored session id and start a new one
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Selected accords (comma separated); config defaults when omitted
    #[arg(long, value_delimiter = ',')]
    accords: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',')]
    brands: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    seasons: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    occasions: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    genders: Vec<String>,
    #[arg(long)]
    min_similarity: Option<f64>,
    #[arg(long)]
    top_accords: Option<usize>,
    /// Display budget (perfume nodes)
    #[arg(long)]
    limit: Option<usize>,
    /// Selected perfume id; it and its closest neighbors are always shown
    #[arg(long)]
    selected: Option<String>,
    /// Only the member's registered perfumes, filtered by their own vocabularies
    #[arg(long)]
    my_perfumes: bool,
}

impl FilterArgs {
    fn to_state(&self, config: &Config, dataset: &Dataset) -> FilterState {
        let mut state = FilterState::from_config(&config.graph);
        if self.my_perfumes {
            let mine = derive_my_perfume_filters(dataset);
            state = state
                .my_perfumes_only(true)
                .with_accords(mine.accords)
                .with_brands(mine.brands)
                .with_seasons(mine.seasons)
                .with_occasions(mine.occasions)
                .with_genders(mine.genders);
        }
        if let Some(accords) = &self.accords {
            state = state.with_accords(accords.iter().cloned());
        }
        if !self.brands.is_empty() {
            state = state.with_brands(self.brands.iter().cloned());
        }
        if !self.seasons.is_empty() {
            state = state.with_seasons(self.seasons.iter().cloned());
        }
        if !self.occasions.is_empty() {
            state = state.with_occasions(self.occasions.iter().cloned());
        }
        if !self.genders.is_empty() {
            state = state.with_genders(self.genders.iter().cloned());
        }
        if let Some(min) = self.min_similarity {
            state = state.with_min_similarity(snap_min_similarity(min));
        }
        if let Some(top) = self.top_accords {
            state = state.with_top_accords(top);
        }
        if let Some(limit) = self.limit {
            state = state.with_display_limit(limit);
        }
        if let Some(id) = &self.selected {
            state = state.with_selected_perfume(id.as_str());
        }
        state
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config, String> {
    let path = path.unwrap_or_else(default_config_path);
    Config::load_or_default(&path).map_err(|e| format!("Failed to load config {}: {}", path.display(), e))
}

fn open_dataset(path: &Path) -> Result<Dataset, String> {
    let file = File::open(path).map_err(|e| format!("cannot open '{}': {}", path.display(), e))?;
    Dataset::from_reader(BufReader::new(file))
        .map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

fn print_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> i32 {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match output {
        Some(path) => match std::fs::write(path, json) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: cannot write '{}': {}", path.display(), e);
                1
            }
        },
        None => {
            println!("{}", json);
            0
        }
    }
}

fn cmd_render(config: &Config, dataset: &Dataset, filters: &FilterArgs, output: Option<&Path>) -> i32 {
    let state = filters.to_state(config, dataset);
    let graph = render(dataset, &state);
    for violation in &graph.violations {
        eprintln!("Warning: {}", violation);
    }
    eprintln!(
        "{} perfumes, {} accords, {} similarity edges, {} accord edges",
        graph.perfume_count(),
        graph.accord_ids().count(),
        graph.edges_of_kind(EdgeKind::SimilarTo).count(),
        graph.edges_of_kind(EdgeKind::HasAccord).count(),
    );
    print_json(&graph, output)
}

fn cmd_neighbors(dataset: &Dataset, id: &str, count: usize) -> i32 {
    let id = NodeId::from(id);
    if dataset.get_perfume(&id).is_none() {
        eprintln!("Error: perfume '{}' not found", id);
        return 1;
    }
    let neighbors = top_similar(dataset.valid_edges(), &id, count);
    if neighbors.is_empty() {
        println!("No similar perfumes.");
        return 0;
    }
    println!("{:<12}  {:<40}  {:>6}", "ID", "NAME", "SCORE");
    println!("{}", "-".repeat(62));
    for neighbor in neighbors {
        let label = dataset
            .get_node(&neighbor.neighbor_id)
            .map(|n| n.label().to_string())
            .unwrap_or_default();
        println!("{:<12}  {:<40}  {:>6.3}", neighbor.neighbor_id, label, neighbor.score);
    }
    0
}

fn cmd_detail(dataset: &Dataset, perfume: Option<&str>, accord: Option<&str>, accords: &[String]) -> i32 {
    match (perfume, accord) {
        (Some(id), _) => {
            let selected = accords.iter().cloned().collect();
            match perfume_detail(dataset, &NodeId::from(id), &selected) {
                Some(detail) => print_json(&detail, None),
                None => {
                    eprintln!("Error: perfume '{}' not found", id);
                    1
                }
            }
        }
        (None, Some(name)) => print_json(&accord_detail(dataset, name), None),
        (None, None) => {
            eprintln!("Error: pass --perfume or --accord");
            1
        }
    }
}

fn cmd_validate(dataset: &Dataset) -> i32 {
    let violations = dataset.validate();
    let meta = dataset.meta_summary();
    println!(
        "{} nodes, {} edges (meta: {} perfumes, built {})",
        dataset.node_count(),
        dataset.edge_count(),
        meta.perfume_count.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
        meta.built_at.as_deref().unwrap_or("?"),
    );
    if violations.is_empty() {
        println!("No integrity problems.");
        return 0;
    }
    for violation in violations {
        println!("{}", violation);
    }
    println!("{} problem(s)", violations.len());
    1
}

fn cmd_fetch(config: &Config, output: &Path, member_id: Option<i64>, base_url: Option<String>) -> i32 {
    let base_url = base_url.unwrap_or_else(|| config.api.base_url.clone());
    let backend = match HttpBackend::new(base_url) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {}", e);
            return 1;
        }
    };

    let store = DatasetStore::new();
    let coordinator = FetchCoordinator::new();
    let query = NetworkQuery::full(&config.api, member_id);
    let result = runtime.block_on(load_dataset(&backend, &store, &coordinator, &query));

    match (result, store.current()) {
        (Ok(Some(_)), Some(current)) => {
            println!(
                "Fetched {} nodes, {} edges from {}",
                current.dataset.node_count(),
                current.dataset.edge_count(),
                backend.base_url()
            );
            print_json(&current.dataset.to_payload(), Some(output))
        }
        (Ok(_), _) => {
            eprintln!("Error: fetch was superseded");
            1
        }
        (Err(e), _) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_session(config: &Config, member_id: Option<i64>, base_url: Option<String>, reset: bool) -> i32 {
    let base_url = base_url.unwrap_or_else(|| config.api.base_url.clone());
    let backend = match HttpBackend::new(base_url) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let db_path = config.session_db_path();
    let storage = match SqliteStorage::open(&db_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Error: cannot open session store '{}': {}", db_path.display(), e);
            return 1;
        }
    };
    if reset {
        if let Err(e) = storage.remove(SESSION_ID_KEY) {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {}", e);
            return 1;
        }
    };

    let options = ScorerOptions::from_config(&config.session, member_id);
    let result = runtime.block_on(async {
        let scorer = SessionScorer::start(backend, storage, options).await?;
        Ok::<_, scentmap::SessionError>(scorer.snapshot())
    });

    match result {
        Ok(snapshot) => print_json(&snapshot, None),
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_retryable() {
                eprintln!("The backend may be temporarily unavailable; try again.");
            }
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Fetch {
            output,
            member_id,
            base_url,
        } => cmd_fetch(&config, &output, member_id, base_url),
        Commands::Session {
            member_id,
            base_url,
            reset,
        } => cmd_session(&config, member_id, base_url, reset),
        Commands::Render {
            dataset,
            filters,
            output,
        } => match open_dataset(&dataset) {
            Ok(ds) => cmd_render(&config, &ds, &filters, output.as_deref()),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Neighbors { dataset, id, count } => match open_dataset(&dataset) {
            Ok(ds) => cmd_neighbors(&ds, &id, count),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Detail {
            dataset,
            perfume,
            accord,
            accords,
        } => match open_dataset(&dataset) {
            Ok(ds) => cmd_detail(&ds, perfume.as_deref(), accord.as_deref(), &accords),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Validate { dataset } => match open_dataset(&dataset) {
            Ok(ds) => cmd_validate(&ds),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
