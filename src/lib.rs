//! refweight — reference-size budgets for content asset graphs
//!
//! Traverse the forward dependency edges of a root asset, sum the on-disk
//! size of every reachable (non-ignored) node, and compare the total against
//! a configured budget to produce a pass/warn/fail verdict.
//!
//! # Features
//! - Cycle-safe worklist traversal with exactly-once expansion
//! - Package and primary (logical) asset identities
//! - Per-kind dependency query policy (hard content refs vs direct manage edges)
//! - Two-tier ignore rules (global root gate + scoped per-node suppression)
//! - Size map listing where the bytes come from
//!
//! # Quickstart (Library)
//! ```no_run
//! use refweight::graph::AssetGraph;
//! use refweight::validator::{validate, ValidationConfig};
//!
//! let graph = AssetGraph::load_json(std::path::Path::new("graph.json")).expect("load graph");
//! let root: refweight::graph::AssetKey = "/Game/Maps/Town".parse().expect("root key");
//! let verdict = validate(&graph, &root, &ValidationConfig::default());
//! println!("{}: {} bytes", verdict.status, verdict.total_bytes);
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! refweight validate --graph graph.json --root /Game/Maps/Town --max-kb 4096 --strictness error
//! refweight sizemap --graph graph.json --root /Game/Maps/Town --top 20
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod graph;
pub mod policy;
pub mod report;
pub mod utils;
pub mod validator;
