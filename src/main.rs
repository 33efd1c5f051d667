use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use genmap_assign::{
    AssignMode, Assigner, AssignerConfig, AssignmentFailure, GeneticCircuit, TruthTable,
    MAX_TRUTH_TABLE_INPUTS,
};
use genmap_catalog::{GateCatalog, GateFunction};
use genmap_logic::{LoadError, LogicCircuit};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Project file picked up from the working directory when `--config` is absent
const PROJECT_FILE: &str = "genmap.toml";

/// GENMAP - Technology mapping for genetic logic circuits
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CatalogSource {
    /// Catalog file (TOML, or JSON by extension)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Built-in catalog name
    #[arg(long)]
    builtin: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind every gate of a circuit to a catalog part
    Assign {
        /// Circuit description (JSON)
        #[arg(short, long)]
        circuit: PathBuf,

        #[command(flatten)]
        source: CatalogSource,

        /// Project file with an [assigner] table
        #[arg(long)]
        config: Option<PathBuf>,

        /// Branch-and-bound search for the optimal bottleneck
        #[arg(short, long)]
        strict: bool,

        /// Strict mode search-frame budget
        #[arg(short, long)]
        budget: Option<u64>,

        /// Wall-clock limit in milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Allow one part at several gates
        #[arg(long)]
        allow_reuse: bool,

        /// Explore first-gate branches on all cores
        #[arg(long)]
        parallel: bool,

        /// Print the steady-state truth table
        #[arg(long)]
        truth_table: bool,

        /// Write the genetic circuit here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a catalog
    Catalog {
        #[command(flatten)]
        source: CatalogSource,
    },

    /// Validate a circuit and print its evaluation order
    Check {
        /// Circuit description (JSON)
        #[arg(short, long)]
        circuit: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let result = match cli.command {
        Commands::Assign {
            circuit,
            source,
            config,
            strict,
            budget,
            deadline_ms,
            allow_reuse,
            parallel,
            truth_table,
            output,
        } => load_config(config.as_deref()).and_then(|mut config| {
            if strict {
                config.mode = AssignMode::Strict;
            }
            if budget.is_some() {
                config.max_search_nodes = budget;
            }
            if deadline_ms.is_some() {
                config.deadline_ms = deadline_ms;
            }
            if allow_reuse {
                config.allow_reuse = Some(true);
            }
            if parallel {
                config.parallel_branches = true;
            }
            assign_circuit(&circuit, &source, config, truth_table, output.as_deref())
        }),

        Commands::Catalog { source } => show_catalog(&source),

        Commands::Check { circuit } => check_circuit(&circuit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("❌ {:#}", error);
            ExitCode::from(exit_code(&error))
        }
    }
}

/// 1 for a failed assignment, 2 for a malformed circuit, 3 otherwise
fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(failure) = error.downcast_ref::<AssignmentFailure>() {
        return if failure.is_malformed() { 2 } else { 1 };
    }
    if error.downcast_ref::<LoadError>().is_some() {
        return 2;
    }
    3
}

fn load_config(path: Option<&Path>) -> Result<AssignerConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if Path::new(PROJECT_FILE).exists() => PathBuf::from(PROJECT_FILE),
        None => return Ok(AssignerConfig::default()),
    };
    info!("Loading assigner config from {:?}", path);
    AssignerConfig::from_path(&path).with_context(|| format!("Failed to load config {:?}", path))
}

fn load_catalog(source: &CatalogSource) -> Result<GateCatalog> {
    match (&source.catalog, &source.builtin) {
        (Some(path), _) => genmap_catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog {:?}", path)),
        (None, Some(name)) => genmap_catalog::builtin_catalog(name).with_context(|| {
            format!(
                "Available catalogs: {}",
                genmap_catalog::list_builtin_catalogs().join(", ")
            )
        }),
        (None, None) => anyhow::bail!("Either --catalog or --builtin is required"),
    }
}

fn load_circuit(path: &Path) -> Result<LogicCircuit> {
    genmap_logic::from_path(path).with_context(|| format!("Failed to load circuit {:?}", path))
}

/// Assign a circuit and write the genetic circuit as JSON
fn assign_circuit(
    circuit: &Path,
    source: &CatalogSource,
    config: AssignerConfig,
    truth_table: bool,
    output: Option<&Path>,
) -> Result<()> {
    let circuit = load_circuit(circuit)?;
    let catalog = load_catalog(source)?;
    let assigner = Assigner::new(&catalog, config).context("Invalid assigner config")?;

    let genetic = assigner.assign(&circuit)?;
    let json = genetic
        .to_json_pretty()
        .context("Failed to serialize genetic circuit")?;

    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!(
                "✅ Assigned '{}' ({} mode, bottleneck {:.4})",
                genetic.name(),
                genetic.mode(),
                genetic.bottleneck()
            );
            eprintln!("📄 Output: {:?}", path);
        }
        None => println!("{}", json),
    }

    if truth_table {
        print_truth_table(&genetic)?;
    }
    Ok(())
}

fn print_truth_table(genetic: &GeneticCircuit) -> Result<()> {
    let table: TruthTable = genetic.truth_table().with_context(|| {
        format!(
            "Truth table needs at most {} inputs",
            MAX_TRUTH_TABLE_INPUTS
        )
    })?;

    eprintln!("\n{}  | {}", table.inputs.join(" "), table.outputs.join(" "));
    for row in &table.rows {
        let inputs: Vec<&str> = row
            .inputs
            .iter()
            .map(|v| if *v { "1" } else { "0" })
            .collect();
        let outputs: Vec<String> = row
            .levels
            .iter()
            .zip(&row.expected)
            .map(|(level, expected)| format!("{:.4}({})", level, u8::from(*expected)))
            .collect();
        eprintln!("{}  | {}", inputs.join(" "), outputs.join(" "));
    }
    for (i, name) in table.outputs.iter().enumerate() {
        match table.on_off_score(i) {
            Some(score) => eprintln!("   {}: on/off {:.2}", name, score),
            None => eprintln!("   {}: constant", name),
        }
    }
    Ok(())
}

fn show_catalog(source: &CatalogSource) -> Result<()> {
    let catalog = load_catalog(source)?;

    println!("📦 Catalog '{}': {} parts", catalog.name(), catalog.len());
    for function in GateFunction::ALL {
        let members = catalog.partition(function);
        if members.is_empty() {
            continue;
        }
        let names: Vec<&str> = members.iter().map(|id| catalog[*id].name.as_str()).collect();
        println!("   {:<5} {:>3}  {}", function.as_str(), members.len(), names.join(", "));
    }

    let sensors: Vec<String> = catalog
        .sensors()
        .map(|s| format!("{} ({})", s.name, s.output))
        .collect();
    if !sensors.is_empty() {
        println!("   sensors    {}", sensors.join(", "));
    }
    println!(
        "   reuse {}",
        if catalog.allow_reuse() { "allowed" } else { "off" }
    );
    Ok(())
}

fn check_circuit(path: &Path) -> Result<()> {
    let circuit = load_circuit(path)?;
    let order = circuit
        .topological_order()
        .map_err(LoadError::from)
        .with_context(|| format!("Circuit {:?} is malformed", path))?;

    println!(
        "✅ '{}': {} inputs, {} gates, {} outputs",
        circuit.name(),
        circuit.inputs().len(),
        circuit.gate_count(),
        circuit.outputs().len()
    );
    for id in &order {
        let node = circuit.node(id);
        println!("   {:>4}  {:<6} {}", id.to_string(), node.op.as_str(), circuit.node_name(id));
    }
    Ok(())
}
