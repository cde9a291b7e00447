//! Traversal policies: which edges to request per node kind, and which
//! resolved classes are exempt from the size budget.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::{AssetKey, DependencyCategory, DependencyFlag, DependencyQuery, ResolvedNode};

/// Per-kind dependency query selection.
///
/// The default mirrors the split between load-time content and logical
/// ownership: package nodes follow hard game references (things that must be
/// loaded together), primary nodes follow direct manage edges only, to avoid
/// fan-out through logical groupings. The split is policy, not law; both
/// queries can be overridden from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPolicy {
    pub package: DependencyQuery,
    pub primary: DependencyQuery,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            package: DependencyQuery::new(
                [DependencyCategory::Package],
                [DependencyFlag::Game, DependencyFlag::Hard],
            ),
            primary: DependencyQuery::new(
                [DependencyCategory::Manage],
                [DependencyFlag::Game, DependencyFlag::Direct],
            ),
        }
    }
}

impl QueryPolicy {
    /// Pure mapping from key kind to the query to run for that node.
    #[must_use]
    pub fn query_for(&self, key: &AssetKey) -> &DependencyQuery {
        match key {
            AssetKey::Package(_) => &self.package,
            AssetKey::Primary { .. } => &self.primary,
        }
    }
}

/// A scoped ignore rule: when the validation root descends from
/// `root_class`, traversed nodes whose class descends from any of `classes`
/// contribute zero bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedIgnore {
    pub root_class: String,
    pub classes: Vec<String>,
}

/// Two-tier ignore configuration.
///
/// `roots` is the global gate: a validation root descending from any listed
/// class makes the whole run NotApplicable before traversal starts.
/// `scoped` suppresses the size of matched nodes during traversal. A
/// scoped-ignored node still has its dependencies expanded, so non-ignored
/// descendants keep counting toward the budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRules {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub scoped: Vec<ScopedIgnore>,
}

impl IgnoreRules {
    /// Global gate: does the root's class hierarchy hit the
    /// root-and-descendants list?
    #[must_use]
    pub fn root_excluded(&self, root: &ResolvedNode) -> bool {
        self.roots.iter().any(|class| root.is_a(class))
    }

    /// The set of scoped classes active for this validation root: the union
    /// of `classes` over every rule whose `root_class` the root descends from.
    #[must_use]
    pub fn active_for<'a>(&'a self, root: &ResolvedNode) -> ActiveIgnores<'a> {
        let classes = self
            .scoped
            .iter()
            .filter(|rule| root.is_a(&rule.root_class))
            .flat_map(|rule| rule.classes.iter().map(String::as_str))
            .collect();
        ActiveIgnores { classes }
    }
}

/// Scoped ignore classes resolved against one validation root.
#[derive(Debug, Clone)]
pub struct ActiveIgnores<'a> {
    classes: BTreeSet<&'a str>,
}

impl ActiveIgnores<'_> {
    /// Per-node gate: ancestor-chain membership against the active set.
    #[must_use]
    pub fn suppresses(&self, node: &ResolvedNode) -> bool {
        node.ancestors.iter().any(|a| self.classes.contains(a.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
