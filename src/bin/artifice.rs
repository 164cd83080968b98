use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "artifice", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered node types.
    Nodes(NodesArgs),
    /// Print the execution order of a graph document.
    Order(GraphArgs),
    /// Load a graph document and report whether every node can run.
    Validate(GraphArgs),
    /// Execute a graph document.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct NodesArgs {
    /// Emit full type descriptions as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct GraphArgs {
    /// Input graph JSON.
    #[arg(long)]
    graph: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input graph JSON.
    #[arg(long)]
    graph: PathBuf,

    /// Re-run every node, ignoring cached outputs.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Stop at the first failed node.
    #[arg(long, default_value_t = false)]
    halt_on_failure: bool,

    /// Compute backend for pixel kernels.
    #[arg(long, default_value = "cpu")]
    backend: artifice::BackendKind,

    /// Write the graph back to this path after running.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Nodes(args) => cmd_nodes(args),
        Command::Order(args) => cmd_order(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn load_graph(path: &std::path::Path) -> anyhow::Result<artifice::NodeGraph> {
    let registry = artifice::NodeRegistry::with_builtin_nodes();
    artifice::NodeGraph::load(path, &registry)
        .with_context(|| format!("load graph '{}'", path.display()))
}

fn cmd_nodes(args: NodesArgs) -> anyhow::Result<()> {
    let registry = artifice::NodeRegistry::with_builtin_nodes();
    if args.json {
        let infos = registry
            .type_names()
            .filter_map(|name| registry.get_node_info(name))
            .collect::<Vec<_>>();
        let text = serde_json::to_string_pretty(&infos).context("serialize node types")?;
        println!("{text}");
        return Ok(());
    }
    for category in registry.get_categories() {
        println!("{category}");
        for name in registry.types_in_category(category) {
            println!("  {name}");
        }
    }
    Ok(())
}

fn cmd_order(args: GraphArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.graph)?;
    for node in graph.iter()? {
        println!("{}\t{}", node.id(), node.type_name());
    }
    Ok(())
}

fn cmd_validate(args: GraphArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.graph)?;
    let order = graph.execution_order()?;
    let mut unconnected = 0usize;
    for id in &order {
        let Some(node) = graph.node(id) else {
            continue;
        };
        for input in node.ports().inputs() {
            if input.is_required() && !input.is_connected() && input.default_value().is_none() {
                unconnected += 1;
                eprintln!("{id}: required input '{}' not connected", input.name());
            }
        }
    }
    if unconnected > 0 {
        anyhow::bail!("{unconnected} required input(s) not connected");
    }
    eprintln!(
        "ok: {} node(s), {} connection(s)",
        order.len(),
        graph.get_connections().len()
    );
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut graph = load_graph(&args.graph)?;
    let opts = artifice::ExecuteOpts {
        force: args.force,
        halt_on_failure: args.halt_on_failure,
    };
    let mut backend = artifice::create_backend(args.backend, &artifice::CpuBackendOpts::default());
    let report = graph.execute_with(&opts, backend.as_mut())?;

    for (id, ok) in &report.results {
        match report.errors.get(id) {
            Some(err) if !ok => eprintln!("{id}: failed: {err}"),
            _ => eprintln!("{id}: ok"),
        }
    }
    for id in &report.skipped {
        eprintln!("{id}: skipped");
    }

    if let Some(path) = &args.save {
        graph
            .save(path)
            .with_context(|| format!("save graph '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    if !report.all_succeeded() {
        anyhow::bail!("{} node(s) failed", report.failed().count());
    }
    Ok(())
}
