//! Progmon CLI - hierarchical progress tracking demos.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use progmon_progress::{
    NodeId, ProgressEvent, ProgressSnapshot, ProgressTree, TracingObserver,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "progmon")]
#[command(about = "Hierarchical progress tracking", long_about = None)]
struct Cli {
    /// Log tree transitions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Two loops of work reporting into one root, printing every 10%
    Demo,
    /// Split a root into children and work them to completion
    Simulate {
        /// Root total
        #[arg(long, default_value = "100")]
        total: f64,
        /// Slice of the root for each child (repeatable)
        #[arg(long = "split", required = true)]
        splits: Vec<f64>,
        /// Work reports per child
        #[arg(long, default_value = "100")]
        steps: usize,
        /// Rescale each child to this total before working it
        #[arg(long)]
        rescale: Option<f64>,
        /// Skip this many reports per child before ending it
        #[arg(long, default_value = "0")]
        leave_short: usize,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Demo => run_demo(cli.verbose, |line: &str| println!("{}", line))?,
        Commands::Simulate { total, splits, steps, rescale, leave_short, json } => {
            let snapshot =
                run_simulation(total, &splits, steps, rescale, leave_short, cli.verbose)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
    }

    Ok(())
}

/// Runs the two-loop demo, handing each output line to `emit`.
fn run_demo<F>(verbose: bool, emit: F) -> Result<()>
where
    F: FnMut(&str) + 'static,
{
    let out = Rc::new(RefCell::new(emit));
    let mut tree = ProgressTree::default();
    let root = tree.root();
    if verbose {
        tree.subscribe(root, TracingObserver::new("demo"))?;
    }

    let sink = out.clone();
    let mut next_milestone = 10;
    let mut buffer = 0.0_f64;
    tree.subscribe(root, move |_: NodeId, event: &ProgressEvent| {
        let mut guard = sink.borrow_mut();
        let emit = &mut *guard;
        match event {
            ProgressEvent::Start => emit("STARTING..."),
            ProgressEvent::Work { value, .. } => {
                buffer += *value;
                if buffer >= 10.0 - 1e-9 {
                    buffer = 0.0;
                    emit(format!("{}%", next_milestone).as_str());
                    next_milestone += 10;
                }
            }
            ProgressEvent::End => emit("DONE!"),
        }
    })?;

    for round in 1..=2 {
        (&mut *out.borrow_mut())(format!("LOOP {}", round).as_str());
        let child = tree.split(root, 50.0).context("allocating loop budget")?;
        work_loop(&mut tree, child)?;
    }

    tree.end(root)?;
    Ok(())
}

/// Works a node without knowing its slice of the root.
fn work_loop(tree: &mut ProgressTree, node: NodeId) -> Result<()> {
    tree.adjust_total(node, 100.0)
        .with_context(|| format!("rescaling {}", node))?;

    for _ in 0..100 {
        tree.work(node, 1.0)?;
    }

    tree.end(node)?;
    Ok(())
}

fn run_simulation(
    total: f64,
    splits: &[f64],
    steps: usize,
    rescale: Option<f64>,
    leave_short: usize,
    verbose: bool,
) -> Result<ProgressSnapshot> {
    let mut tree = ProgressTree::new(total).context("creating root")?;
    let root = tree.root();
    if verbose {
        tree.subscribe(root, TracingObserver::new("root"))?;
    }

    for (index, amount) in splits.iter().copied().enumerate() {
        let child = tree
            .split(root, amount)
            .with_context(|| format!("splitting child {} ({})", index + 1, amount))?;
        if verbose {
            tree.subscribe(child, TracingObserver::new(format!("child {}", index + 1)))?;
        }
        if let Some(new_total) = rescale {
            tree.adjust_total(child, new_total)
                .with_context(|| format!("rescaling {}", child))?;
        }

        if steps > 0 {
            let step = tree.node(child)?.total() / steps as f64;
            for _ in 0..steps.saturating_sub(leave_short) {
                tree.work(child, step)?;
            }
        }
        let before = tree.percent(root)?;
        tree.end(child)?;
        info!("Child {} ended, root {:.1}% -> {:.1}%", child, before, tree.percent(root)?);
    }

    tree.end(root)?;
    Ok(tree.snapshot())
}

fn print_snapshot(snapshot: &ProgressSnapshot) {
    println!("Progress ({} nodes)", snapshot.nodes.len());
    for node in &snapshot.nodes {
        println!(
            "{}{} | {} | {:.2}/{:.2} ({:.1}%)",
            "  ".repeat(node.depth + 1),
            node.id,
            node.state.as_str().to_uppercase(),
            node.worked,
            node.total,
            node.percent,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progmon_progress::NodeState;

    #[test]
    fn test_demo_output() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = lines.clone();
        run_demo(false, move |line: &str| sink.borrow_mut().push(line.to_string())).unwrap();

        let mut expected = vec!["LOOP 1".to_string(), "STARTING...".to_string()];
        expected.extend((1..=5).map(|n| format!("{}%", n * 10)));
        expected.push("LOOP 2".to_string());
        expected.extend((6..=10).map(|n| format!("{}%", n * 10)));
        expected.push("DONE!".to_string());
        assert_eq!(*lines.borrow(), expected);
    }

    #[test]
    fn test_simulation_completes_root() {
        let snapshot = run_simulation(100.0, &[50.0, 50.0], 100, Some(100.0), 0, false).unwrap();
        let root = snapshot.root().unwrap();
        assert_eq!(root.state, NodeState::Done);
        assert!((root.percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulation_reconciles_short_children() {
        let snapshot = run_simulation(100.0, &[30.0, 30.0], 10, None, 4, false).unwrap();
        assert!((snapshot.root().unwrap().worked - 60.0).abs() < 1e-9);
        assert!(snapshot.nodes[1..].iter().all(|n| n.state == NodeState::Done));
    }

    #[test]
    fn test_simulation_rejects_overcommitted_splits() {
        let err = run_simulation(100.0, &[60.0, 60.0], 10, None, 0, false).unwrap_err();
        assert!(err.to_string().contains("splitting child 2"));
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "progmon", "simulate", "--split", "40", "--split", "60", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate { splits, json, total, .. } => {
                assert_eq!(splits, vec![40.0, 60.0]);
                assert!(json);
                assert_eq!(total, 100.0);
            }
            _ => panic!("expected simulate"),
        }
    }
}
