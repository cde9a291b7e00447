//! Asset graph model for the crate.
//!
//! This module defines the identities and metadata the traversal works over
//! (`AssetKey`, `DependencyQuery`, `ResolvedNode`) and `AssetGraph`, a
//! serde-backed in-memory graph of asset records and typed dependency edges
//! that serves as the default `source::DependencySource`.
//!
//! You typically load a graph via `AssetGraph::load_json` and pass it to
//! `crate::validator::validate`.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

pub mod source;

/// Sentinel class name for nodes that could not be resolved to a concrete asset.
pub const MISSING_CLASS: &str = "MissingAsset";

/// Identity of a node in the dependency graph.
///
/// Either a package-style path (e.g. `/Game/Maps/Town`) or a primary
/// (logical) identifier made of an asset kind and a name (e.g. `Map:Town`).
/// Totally ordered and hashable so visitation sets and test output are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    Package(String),
    Primary { kind: String, name: String },
}

impl AssetKey {
    /// Package path for package-style keys, `None` for primary keys.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        match self {
            AssetKey::Package(name) => Some(name.as_str()),
            AssetKey::Primary { .. } => None,
        }
    }

    /// True when the key carries no usable identity (empty payloads).
    /// Degenerate keys are skipped by the traversal: no size, no expansion.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            AssetKey::Package(name) => name.is_empty(),
            AssetKey::Primary { kind, name } => kind.is_empty() || name.is_empty(),
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKey::Package(name) => write!(f, "{name}"),
            AssetKey::Primary { kind, name } => write!(f, "{kind}:{name}"),
        }
    }
}

impl FromStr for AssetKey {
    type Err = crate::errors::RefweightError;

    /// Parse `Kind:Name` as a primary key, anything else as a package path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(crate::errors::RefweightError::KeyParse {
                input: s.to_string(),
                reason: "empty key".to_string(),
            });
        }
        if let Some((kind, name)) = s.split_once(':') {
            if kind.is_empty() || name.is_empty() {
                return Err(crate::errors::RefweightError::KeyParse {
                    input: s.to_string(),
                    reason: "primary key needs both a kind and a name".to_string(),
                });
            }
            return Ok(AssetKey::Primary { kind: kind.to_string(), name: name.to_string() });
        }
        Ok(AssetKey::Package(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCategory {
    Package,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyFlag {
    Game,
    Hard,
    Direct,
}

/// Which edges to request from a `DependencySource` for one node.
/// Derived per-node by `crate::policy::QueryPolicy`, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyQuery {
    pub categories: BTreeSet<DependencyCategory>,
    pub flags: BTreeSet<DependencyFlag>,
}

impl DependencyQuery {
    #[must_use]
    pub fn new(
        categories: impl IntoIterator<Item = DependencyCategory>,
        flags: impl IntoIterator<Item = DependencyFlag>,
    ) -> Self {
        Self { categories: categories.into_iter().collect(), flags: flags.into_iter().collect() }
    }

    /// An edge matches when its category was requested and it carries every
    /// requested flag.
    #[must_use]
    pub fn matches(&self, edge: &Edge) -> bool {
        self.categories.contains(&edge.category) && self.flags.is_subset(&edge.flags)
    }
}

/// Metadata resolved for an `AssetKey`.
///
/// `ancestors` is the precomputed class chain from most-specific (the class
/// itself) to most-general, so ignore-rule matching is a membership test
/// rather than runtime reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub key: AssetKey,
    pub class_name: String,
    pub ancestors: Vec<String>,
    pub on_disk_size: Option<u64>,
    pub exists: bool,
}

impl ResolvedNode {
    /// Placeholder for a key that resolved to nothing. Carries no size and is
    /// never expanded; the traversal continues past it.
    #[must_use]
    pub fn missing(key: AssetKey) -> Self {
        Self {
            key,
            class_name: MISSING_CLASS.to_string(),
            ancestors: vec![MISSING_CLASS.to_string()],
            on_disk_size: None,
            exists: false,
        }
    }

    /// Synthetic metadata for a primary key with no backing record: the class
    /// is the primary kind, there is no size, and the node is expandable.
    #[must_use]
    pub fn synthetic(kind: &str, key: AssetKey) -> Self {
        Self {
            key,
            class_name: kind.to_string(),
            ancestors: vec![kind.to_string()],
            on_disk_size: None,
            exists: true,
        }
    }

    /// Class-hierarchy membership: is this node's class `class` or a
    /// descendant of it?
    #[must_use]
    pub fn is_a(&self, class: &str) -> bool {
        self.ancestors.iter().any(|a| a == class)
    }
}

/// One typed forward dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub to: AssetKey,
    pub category: DependencyCategory,
    #[serde(default)]
    pub flags: BTreeSet<DependencyFlag>,
}

/// One asset record in the graph file.
///
/// `ancestors` lists the classes above `class`, most-specific first; the
/// resolved node prepends `class` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub key: AssetKey,
    pub class: String,
    #[serde(default)]
    pub ancestors: Vec<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub deps: Vec<Edge>,
}

/// In-memory asset graph: the default read-only dependency oracle.
///
/// `registry`, when set, is the active registry view: edges to keys outside
/// it are dropped by `filter_for_registry`. `None` means pass-through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetGraph {
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub registry: Option<BTreeSet<AssetKey>>,
    #[serde(skip, default)]
    index: HashMap<AssetKey, usize>,
}

impl AssetGraph {
    /// Add a record, replacing any existing record with the same key.
    pub fn insert(&mut self, record: AssetRecord) {
        match self.index.get(&record.key) {
            Some(&i) => self.assets[i] = record,
            None => {
                self.index.insert(record.key.clone(), self.assets.len());
                self.assets.push(record);
            }
        }
    }

    #[must_use]
    pub fn record(&self, key: &AssetKey) -> Option<&AssetRecord> {
        self.index.get(key).map(|&i| &self.assets[i])
    }

    fn reindex(&mut self) {
        self.index =
            self.assets.iter().enumerate().map(|(i, r)| (r.key.clone(), i)).collect();
    }

    /// Load a graph from a JSON file.
    ///
    /// # Errors
    /// Returns `RefweightError::Io` if reading fails and
    /// `RefweightError::Graph` if the JSON does not describe a valid graph.
    pub fn load_json(path: &std::path::Path) -> Result<Self, crate::errors::RefweightError> {
        let data = std::fs::read_to_string(path)?;
        let mut graph: AssetGraph = serde_json::from_str(&data).map_err(|e| {
            crate::errors::RefweightError::Graph {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        graph.reindex();
        Ok(graph)
    }

    /// Save the graph as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `RefweightError::Io` if serialization or writing fails.
    pub fn save_json(&self, path: &std::path::Path) -> Result<(), crate::errors::RefweightError> {
        let data = serde_json::to_string_pretty(self).map_err(|e| {
            crate::errors::RefweightError::Io(std::io::Error::other(e.to_string()))
        })?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
