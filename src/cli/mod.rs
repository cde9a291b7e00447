use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "refweight",
    version,
    about = "Reference-size budgets for content asset graphs",
    long_about = "Traverse the forward dependencies of a root asset in a JSON asset graph, sum on-disk sizes across the reachable subgraph, and compare the total against a configured budget. Keys are package paths (/Game/Maps/Town) or primary ids (Map:Town)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate one or more roots against the size budget
    Validate {
        /// Path to the asset graph JSON file
        #[arg(long)]
        graph: String,
        /// Root asset key; repeat to validate several roots in one run
        #[arg(long = "root", value_name = "KEY", required = true)]
        roots: Vec<String>,
        /// Path to a TOML configuration file (refweight.toml)
        #[arg(long)]
        config: Option<String>,
        /// Budget in kilobytes (overrides the config file)
        #[arg(long)]
        max_kb: Option<u64>,
        /// Severity of a budget overflow
        #[arg(long, value_parser = ["warn", "error"])]
        strictness: Option<String>,
        /// Stop expanding after visiting this many nodes
        #[arg(long)]
        max_nodes: Option<usize>,
        /// Output format: text or json
        #[arg(long, value_parser = ["text", "json"], default_value = "text")]
        format: String,
    },
    /// List the nodes contributing to one root's total, largest first
    Sizemap {
        /// Path to the asset graph JSON file
        #[arg(long)]
        graph: String,
        /// Root asset key
        #[arg(long, value_name = "KEY")]
        root: String,
        /// Path to a TOML configuration file (refweight.toml)
        #[arg(long)]
        config: Option<String>,
        /// Budget in kilobytes (overrides the config file)
        #[arg(long)]
        max_kb: Option<u64>,
        /// Severity of a budget overflow
        #[arg(long, value_parser = ["warn", "error"])]
        strictness: Option<String>,
        /// Stop expanding after visiting this many nodes
        #[arg(long)]
        max_nodes: Option<usize>,
        /// Keep only the top N rows (0 = all)
        #[arg(long, default_value_t = 0)]
        top: usize,
        /// Output format: text or json
        #[arg(long, value_parser = ["text", "json"], default_value = "text")]
        format: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
