use cladeshift::edit::{EditCommand, TreeSession};
use cladeshift::layout::LayoutConfig;
use std::error::Error;
use std::{env, fs, process};
use tracing_subscriber::EnvFilter;

/// Usage: `cladeshift <tree.nwk> [layout.json] [commands.json]`
///
/// Runs the commands (if any), then prints the canonical text and the render
/// nodes of one layout pass as JSON. Log output is controlled by `RUST_LOG`.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: cladeshift <tree.nwk> [layout.json] [commands.json]");
        process::exit(2);
    }
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let newick = fs::read_to_string(&args[0])?;
    let config = match args.get(1) {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::new(),
    };

    let mut session = TreeSession::new(newick.trim(), config)?;
    if let Some(path) = args.get(2) {
        for command in EditCommand::list_from_json(&fs::read_to_string(path)?)? {
            session.apply(command)?;
        }
    }

    let nodes = session.render_nodes()?;
    println!("{}", session.canonical_text());
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}
