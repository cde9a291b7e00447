use crate::cli::{Cli, Commands};
use crate::graph::{AssetGraph, AssetKey};
use crate::report;
use crate::validator::{size_map, validate, ValidationConfig, Verdict, VerdictStatus};
use clap::CommandFactory;
use clap_complete::generate;
use rayon::prelude::*;
use std::io;

/// Run the CLI logic in-process.
///
/// Returns an exit code: 0 for pass/warn/not-applicable, 1 when any root
/// fails its budget, 2 for load or usage errors.
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = crate::cli::Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Validate { graph, roots, config, max_kb, strictness, max_nodes, format } => {
            let graph = match load_graph(&graph) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let roots = match parse_roots(&roots) {
                Ok(r) => r,
                Err(code) => return code,
            };
            let vconfig = build_config(config.as_deref(), max_kb, strictness.as_deref(), max_nodes);

            // Each run owns its traversal state; the graph is a shared
            // read-only oracle, so roots can validate in parallel.
            let mut verdicts: Vec<Verdict> =
                roots.par_iter().map(|root| validate(&graph, root, &vconfig)).collect();
            verdicts.sort_by(|a, b| a.root.cmp(&b.root));

            if format == "json" {
                match report::render_json(&verdicts) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("JSON encode error: {e}");
                        return 2;
                    }
                }
            } else {
                for v in &verdicts {
                    println!("{}", report::render_text(v, vconfig.max_bytes));
                }
            }

            i32::from(verdicts.iter().any(|v| v.status == VerdictStatus::Fail))
        }
        Commands::Sizemap { graph, root, config, max_kb, strictness, max_nodes, top, format } => {
            let graph = match load_graph(&graph) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let root: AssetKey = match root.parse() {
                Ok(k) => k,
                Err(e) => {
                    eprintln!("{e}");
                    return 2;
                }
            };
            let vconfig = build_config(config.as_deref(), max_kb, strictness.as_deref(), max_nodes);

            let (verdict, mut rows) = size_map(&graph, &root, &vconfig);
            if top > 0 {
                rows.truncate(top);
            }

            if format == "json" {
                match report::render_rows_json(&rows) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("JSON encode error: {e}");
                        return 2;
                    }
                }
            } else {
                if !rows.is_empty() {
                    println!("{}", report::render_rows_table(&rows));
                }
                println!("{}", report::render_text(&verdict, vconfig.max_bytes));
            }

            i32::from(verdict.status == VerdictStatus::Fail)
        }
    }
}

fn load_graph(path: &str) -> Result<AssetGraph, i32> {
    AssetGraph::load_json(std::path::Path::new(path)).map_err(|e| {
        eprintln!("Load graph failed: {e}");
        2
    })
}

fn parse_roots(roots: &[String]) -> Result<Vec<AssetKey>, i32> {
    let mut out = Vec::with_capacity(roots.len());
    for raw in roots {
        match raw.parse::<AssetKey>() {
            Ok(k) => out.push(k),
            Err(e) => {
                eprintln!("{e}");
                return Err(2);
            }
        }
    }
    Ok(out)
}

// Precedence: defaults, then the config file, then explicit flags.
fn build_config(
    config_path: Option<&str>,
    max_kb: Option<u64>,
    strictness: Option<&str>,
    max_nodes: Option<usize>,
) -> ValidationConfig {
    let mut vconfig = ValidationConfig::default();
    if let Some(path) = config_path {
        if let Some(cfg) = crate::utils::config::load_config_at(std::path::Path::new(path)) {
            vconfig = cfg.apply(vconfig);
        }
    } else if let Some(cfg) = crate::utils::config::load_config_near(std::path::Path::new(".")) {
        vconfig = cfg.apply(vconfig);
    }
    if let Some(kb) = max_kb {
        vconfig.max_bytes = kb.saturating_mul(1024);
    }
    if let Some(s) = strictness {
        if let Some(parsed) = crate::utils::config::parse_strictness(s) {
            vconfig.strictness = parsed;
        }
    }
    if let Some(n) = max_nodes {
        vconfig.max_nodes = Some(n);
    }
    vconfig
}
