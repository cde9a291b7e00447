//! The dependency oracle consumed by the traversal.
//!
//! `DependencySource` is the capability seam between the engine and whatever
//! actually knows the graph: resolution never fails the run (missing assets
//! degrade to placeholders), edge queries are filtered by category/flags, and
//! `filter_for_registry` applies the environment's active registry view as an
//! opaque pass-through filter.
use crate::graph::{AssetGraph, AssetKey, DependencyQuery, ResolvedNode};

pub trait DependencySource {
    /// Metadata and size lookup. Must not fail: keys that resolve to nothing
    /// come back as placeholder nodes (`exists == false`).
    fn resolve(&self, key: &AssetKey) -> ResolvedNode;

    /// Forward edges of `key` matching the query's categories and flags.
    fn dependencies(&self, key: &AssetKey, query: &DependencyQuery) -> Vec<AssetKey>;

    /// Environment-specific edge filtering (e.g. drop keys outside the
    /// active content registry view).
    fn filter_for_registry(&self, keys: Vec<AssetKey>) -> Vec<AssetKey>;
}

impl DependencySource for AssetGraph {
    fn resolve(&self, key: &AssetKey) -> ResolvedNode {
        if let Some(record) = self.record(key) {
            let mut ancestors = Vec::with_capacity(record.ancestors.len() + 1);
            ancestors.push(record.class.clone());
            ancestors.extend(record.ancestors.iter().cloned());
            return ResolvedNode {
                key: key.clone(),
                class_name: record.class.clone(),
                ancestors,
                on_disk_size: record.size,
                exists: true,
            };
        }
        match key {
            // Primary ids with no backing record still get synthetic
            // metadata so their manage edges can be followed.
            AssetKey::Primary { kind, .. } => ResolvedNode::synthetic(kind, key.clone()),
            AssetKey::Package(_) => ResolvedNode::missing(key.clone()),
        }
    }

    fn dependencies(&self, key: &AssetKey, query: &DependencyQuery) -> Vec<AssetKey> {
        match self.record(key) {
            Some(record) => record
                .deps
                .iter()
                .filter(|edge| query.matches(edge))
                .map(|edge| edge.to.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    fn filter_for_registry(&self, keys: Vec<AssetKey>) -> Vec<AssetKey> {
        match &self.registry {
            Some(view) => keys.into_iter().filter(|k| view.contains(k)).collect(),
            None => keys,
        }
    }
}
