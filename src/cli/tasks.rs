//! `kiln tasks`: show the task graph.

use std::fmt::Write;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use crate::config::SiteConfig;
use crate::task::{TaskGraph, site};

pub fn print_tasks(config: &SiteConfig) -> Result<()> {
    let graph = site::graph(config)?;
    print!("{}", describe(&graph));
    Ok(())
}

/// One block per task in execution order.
fn describe(graph: &TaskGraph) -> String {
    let mut out = String::new();
    for task in graph.topo_order() {
        let _ = write!(out, "{}", task.name.if_supports_color(Stream::Stdout, |t| t.bold()));
        let after = graph.dependencies(task.name.as_str());
        if !after.is_empty() {
            let names: Vec<_> = after.iter().map(|n| n.as_str()).collect();
            let _ = write!(out, " (after {})", names.join(", "));
        }
        out.push('\n');
        for input in &task.inputs {
            let _ = writeln!(out, "  < {input}");
        }
        for output in &task.outputs {
            let _ = writeln!(out, "  > {output}");
        }
    }
    out
}
