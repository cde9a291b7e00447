//! The traversal engine and budget evaluation.
//!
//! `validate` walks the forward dependency graph of a root asset with a
//! worklist and a visited set, accumulates on-disk size across the reachable
//! filtered subgraph, and compares the total against the configured budget.
//! `size_map` runs the same engine but records one row per traversed node so
//! callers can see where the bytes come from.
//!
//! All failures inside a run are non-fatal: unresolvable nodes degrade to
//! placeholders, missing sizes count as zero, malformed keys are skipped.
//! The only early exit is the NotApplicable short-circuit (disabled
//! validator, or the root hit the global ignore gate), which is a scope
//! decision, not an error.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::graph::source::DependencySource;
use crate::graph::AssetKey;
use crate::policy::{IgnoreRules, QueryPolicy};

/// Severity of a budget overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
    NotApplicable,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictStatus::Pass => "pass",
            VerdictStatus::Warn => "warn",
            VerdictStatus::Fail => "fail",
            VerdictStatus::NotApplicable => "not-applicable",
        };
        f.write_str(s)
    }
}

/// Everything one validation run needs, passed in explicitly; there is no
/// ambient settings lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Master switch; a disabled validator returns NotApplicable.
    pub enabled: bool,
    /// Budget in bytes. Totals at or under the budget pass.
    pub max_bytes: u64,
    pub strictness: Strictness,
    /// Package paths starting with any of these are code references: always
    /// acceptable, never sized, never expanded.
    pub code_prefixes: Vec<String>,
    /// Optional cap on visited nodes; hitting it truncates the run instead
    /// of erroring. The partial total is a lower bound.
    pub max_nodes: Option<usize>,
    pub ignore: IgnoreRules,
    pub query: QueryPolicy,
}

pub const DEFAULT_MAX_KILOBYTES: u64 = 4096;
pub const DEFAULT_CODE_PREFIX: &str = "/Script/";

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bytes: DEFAULT_MAX_KILOBYTES * 1024,
            strictness: Strictness::Warn,
            code_prefixes: vec![DEFAULT_CODE_PREFIX.to_string()],
            max_nodes: None,
            ignore: IgnoreRules::default(),
            query: QueryPolicy::default(),
        }
    }
}

/// Structured outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub total_bytes: u64,
    pub visited: usize,
    /// True when the visited-node cap stopped the traversal early; the total
    /// is then a lower bound.
    pub truncated: bool,
    pub root: AssetKey,
}

/// One traversed node's contribution, for size-map output. Rows with
/// `ignored == false` sum to the verdict total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRow {
    pub key: AssetKey,
    pub class: String,
    pub bytes: u64,
    pub ignored: bool,
}

enum KeyClass<'a> {
    Unsupported,
    CodeReference(&'a str),
    Concrete,
}

fn classify<'a>(key: &'a AssetKey, config: &ValidationConfig) -> KeyClass<'a> {
    if key.is_degenerate() {
        return KeyClass::Unsupported;
    }
    if let Some(name) = key.package_name() {
        if config.code_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return KeyClass::CodeReference(name);
        }
    }
    KeyClass::Concrete
}

/// Compare an accumulated total against the budget. Equality passes; only
/// strict overflow warns or fails, per `strictness`.
#[must_use]
pub fn evaluate_budget(total_bytes: u64, config: &ValidationConfig) -> VerdictStatus {
    if total_bytes > config.max_bytes {
        match config.strictness {
            Strictness::Error => VerdictStatus::Fail,
            Strictness::Warn => VerdictStatus::Warn,
        }
    } else {
        VerdictStatus::Pass
    }
}

/// Validate `root` against the configured budget.
///
/// The traversal owns its state exclusively; `source` is used as a read-only
/// oracle, so concurrent validations of different roots need no locking.
#[must_use]
pub fn validate<S: DependencySource>(
    source: &S,
    root: &AssetKey,
    config: &ValidationConfig,
) -> Verdict {
    let (verdict, _) = run(source, root, config, false);
    verdict
}

/// Validate `root` and also report one row per traversed node, sorted by
/// contribution descending (ties broken by key for determinism).
#[must_use]
pub fn size_map<S: DependencySource>(
    source: &S,
    root: &AssetKey,
    config: &ValidationConfig,
) -> (Verdict, Vec<SizeRow>) {
    let (verdict, mut rows) = run(source, root, config, true);
    rows.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.key.cmp(&b.key)));
    (verdict, rows)
}

fn run<S: DependencySource>(
    source: &S,
    root: &AssetKey,
    config: &ValidationConfig,
    collect_rows: bool,
) -> (Verdict, Vec<SizeRow>) {
    let not_applicable = |visited: usize| Verdict {
        status: VerdictStatus::NotApplicable,
        total_bytes: 0,
        visited,
        truncated: false,
        root: root.clone(),
    };

    if !config.enabled {
        return (not_applicable(0), Vec::new());
    }

    // Global gate: the root's own class hierarchy can scope the whole run
    // out before any traversal happens.
    let root_node = source.resolve(root);
    if config.ignore.root_excluded(&root_node) {
        debug!(root = %root, class = %root_node.class_name, "root class is ignored; not applicable");
        return (not_applicable(0), Vec::new());
    }
    let active_ignores = config.ignore.active_for(&root_node);

    let mut visited: HashSet<AssetKey> = HashSet::new();
    let mut frontier: Vec<AssetKey> = vec![root.clone()];
    let mut rows: Vec<SizeRow> = Vec::new();
    let mut total: u64 = 0;
    let mut truncated = false;
    let mut cursor = 0usize;

    while cursor < frontier.len() {
        if let Some(cap) = config.max_nodes {
            if visited.len() >= cap {
                warn!(root = %root, cap, "visited-node cap reached; truncating traversal");
                truncated = true;
                break;
            }
        }

        let key = frontier[cursor].clone();
        let at_root = cursor == 0;
        cursor += 1;

        // Exactly-once visitation; this also bounds cyclic graphs.
        if !visited.insert(key.clone()) {
            continue;
        }

        match classify(&key, config) {
            KeyClass::Unsupported => {
                debug!(key = %key, "unsupported key not included in size");
                continue;
            }
            KeyClass::CodeReference(name) => {
                // Code references are defined as always acceptable.
                debug!(key = name, "code reference skipped");
                continue;
            }
            KeyClass::Concrete => {}
        }

        let node = source.resolve(&key);
        let suppressed = active_ignores.suppresses(&node);

        // The root is visited and expanded like any other node, but it is
        // never a reference to itself: its size stays out of the total.
        if node.exists && !at_root {
            let bytes = match node.on_disk_size {
                Some(bytes) => bytes,
                None => {
                    warn!(key = %key, class = %node.class_name, "cannot stat size; counting zero");
                    0
                }
            };
            if suppressed {
                debug!(key = %key, class = %node.class_name, bytes, "scoped ignore suppressed contribution");
            } else {
                total += bytes;
            }
            if collect_rows {
                rows.push(SizeRow {
                    key: key.clone(),
                    class: node.class_name.clone(),
                    bytes,
                    ignored: suppressed,
                });
            }
        }

        // Scoped-ignored nodes are still expanded: only their own size is
        // exempt, their descendants keep counting.
        if node.exists {
            let deps = source.dependencies(&key, config.query.query_for(&key));
            let deps = source.filter_for_registry(deps);
            frontier.extend(deps);
        }
    }

    let verdict = Verdict {
        status: evaluate_budget(total, config),
        total_bytes: total,
        visited: visited.len(),
        truncated,
        root: root.clone(),
    };
    (verdict, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        AssetGraph, AssetRecord, DependencyCategory, DependencyFlag, Edge,
    };
    use crate::policy::ScopedIgnore;

    fn pkg(name: &str) -> AssetKey {
        AssetKey::Package(name.to_string())
    }

    fn hard(to: &AssetKey) -> Edge {
        Edge {
            to: to.clone(),
            category: DependencyCategory::Package,
            flags: [DependencyFlag::Game, DependencyFlag::Hard].into(),
        }
    }

    fn manage(to: &AssetKey) -> Edge {
        Edge {
            to: to.clone(),
            category: DependencyCategory::Manage,
            flags: [DependencyFlag::Game, DependencyFlag::Direct].into(),
        }
    }

    fn asset(g: &mut AssetGraph, key: &AssetKey, class: &str, size: Option<u64>, deps: Vec<Edge>) {
        g.insert(AssetRecord {
            key: key.clone(),
            class: class.to_string(),
            ancestors: vec!["Object".to_string()],
            size,
            deps,
        });
    }

    fn strict(max_bytes: u64) -> ValidationConfig {
        ValidationConfig {
            max_bytes,
            strictness: Strictness::Error,
            ..ValidationConfig::default()
        }
    }

    #[test]
    fn root_size_is_excluded() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let child = pkg("/Game/Child");
        asset(&mut g, &root, "Blueprint", Some(9_999), vec![hard(&child)]);
        asset(&mut g, &child, "Texture", Some(2_000), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 2_000);
        assert_eq!(v.visited, 2);
    }

    #[test]
    fn cycle_terminates_and_visits_once() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let a = pkg("/Game/A");
        asset(&mut g, &root, "Blueprint", Some(10), vec![hard(&a)]);
        asset(&mut g, &a, "Blueprint", Some(100), vec![hard(&root)]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.visited, 2);
        assert_eq!(v.total_bytes, 100);
        assert!(!v.truncated);
    }

    #[test]
    fn diamond_counts_shared_node_once() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let a = pkg("/Game/A");
        let b = pkg("/Game/B");
        let c = pkg("/Game/C");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&a), hard(&b)]);
        asset(&mut g, &a, "Mesh", Some(10), vec![hard(&c)]);
        asset(&mut g, &b, "Mesh", Some(20), vec![hard(&c)]);
        asset(&mut g, &c, "Texture", Some(500), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 10 + 20 + 500);
        assert_eq!(v.visited, 4);
    }

    #[test]
    fn code_reference_not_sized_and_not_expanded() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let code = pkg("/Script/Engine.StaticMesh");
        let hidden = pkg("/Game/Hidden");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&code)]);
        // Even a sized record behind a code path must not contribute.
        asset(&mut g, &code, "Class", Some(77_777), vec![hard(&hidden)]);
        asset(&mut g, &hidden, "Texture", Some(1_000), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 0);
    }

    #[test]
    fn unsupported_key_is_skipped() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let child = pkg("/Game/Child");
        asset(
            &mut g,
            &root,
            "Blueprint",
            Some(1),
            vec![hard(&AssetKey::Package(String::new())), hard(&child)],
        );
        asset(&mut g, &child, "Texture", Some(300), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 300);
    }

    #[test]
    fn unresolved_package_counts_zero_and_stops_there() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let ghost = pkg("/Game/Ghost");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&ghost)]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 0);
        assert_eq!(v.status, VerdictStatus::Pass);
        assert_eq!(v.visited, 2);
    }

    #[test]
    fn missing_size_counts_zero_but_children_still_count() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let mid = pkg("/Game/Mid");
        let leaf = pkg("/Game/Leaf");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&mid)]);
        asset(&mut g, &mid, "Mesh", None, vec![hard(&leaf)]);
        asset(&mut g, &leaf, "Texture", Some(250), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 250);
    }

    #[test]
    fn primary_root_follows_manage_edges_only() {
        let mut g = AssetGraph::default();
        let root = AssetKey::Primary { kind: "Map".into(), name: "Town".into() };
        let owned = pkg("/Game/Owned");
        let hard_dep = pkg("/Game/HardDep");
        g.insert(AssetRecord {
            key: root.clone(),
            class: "Map".into(),
            ancestors: vec![],
            size: None,
            deps: vec![manage(&owned), hard(&hard_dep)],
        });
        asset(&mut g, &owned, "World", Some(4_000), vec![]);
        asset(&mut g, &hard_dep, "Texture", Some(9_000), vec![]);

        let v = validate(&g, &root, &strict(u64::MAX));
        // The hard package edge does not match the primary query.
        assert_eq!(v.total_bytes, 4_000);
    }

    #[test]
    fn synthetic_primary_dependency_expands_without_record() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let prim = AssetKey::Primary { kind: "Bundle".into(), name: "Audio".into() };
        // No record for `prim`: it gets synthetic metadata, no size, and its
        // (empty) manage edges are queried without failing the run.
        asset(
            &mut g,
            &root,
            "Blueprint",
            Some(1),
            vec![Edge {
                to: prim,
                category: DependencyCategory::Package,
                flags: [DependencyFlag::Game, DependencyFlag::Hard].into(),
            }],
        );

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 0);
        assert_eq!(v.visited, 2);
    }

    #[test]
    fn scoped_ignore_zeroes_node_but_expands_children() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Sword");
        let icon = pkg("/Game/SwordIcon");
        let behind = pkg("/Game/BehindIcon");
        g.insert(AssetRecord {
            key: root.clone(),
            class: "SwordDefinition".into(),
            ancestors: vec!["ItemDefinition".into(), "Object".into()],
            size: Some(1),
            deps: vec![hard(&icon)],
        });
        g.insert(AssetRecord {
            key: icon.clone(),
            class: "IconTexture".into(),
            ancestors: vec!["Texture".into(), "Object".into()],
            size: Some(8_000),
            deps: vec![hard(&behind)],
        });
        asset(&mut g, &behind, "Texture", Some(600), vec![]);

        let mut config = strict(u64::MAX);
        config.ignore.scoped = vec![ScopedIgnore {
            root_class: "ItemDefinition".into(),
            classes: vec!["IconTexture".into()],
        }];

        let v = validate(&g, &root, &config);
        // Icon suppressed, but the texture behind it still counts.
        assert_eq!(v.total_bytes, 600);
    }

    #[test]
    fn scoped_ignore_inactive_for_unrelated_root() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let icon = pkg("/Game/Icon");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&icon)]);
        g.insert(AssetRecord {
            key: icon.clone(),
            class: "IconTexture".into(),
            ancestors: vec!["Texture".into()],
            size: Some(8_000),
            deps: vec![],
        });

        let mut config = strict(u64::MAX);
        config.ignore.scoped = vec![ScopedIgnore {
            root_class: "ItemDefinition".into(),
            classes: vec!["IconTexture".into()],
        }];

        let v = validate(&g, &root, &config);
        assert_eq!(v.total_bytes, 8_000);
    }

    #[test]
    fn root_ignore_gate_short_circuits() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/DebugThing");
        let child = pkg("/Game/Child");
        g.insert(AssetRecord {
            key: root.clone(),
            class: "DebugOverlay".into(),
            ancestors: vec!["EditorOnlyWidget".into(), "Object".into()],
            size: Some(1),
            deps: vec![hard(&child)],
        });
        asset(&mut g, &child, "Texture", Some(5_000), vec![]);

        let mut config = strict(0);
        config.ignore.roots = vec!["EditorOnlyWidget".into()];

        let v = validate(&g, &root, &config);
        assert_eq!(v.status, VerdictStatus::NotApplicable);
        assert_eq!(v.total_bytes, 0);
        assert_eq!(v.visited, 0);
    }

    #[test]
    fn disabled_validator_is_not_applicable() {
        let g = AssetGraph::default();
        let config = ValidationConfig { enabled: false, ..ValidationConfig::default() };
        let v = validate(&g, &pkg("/Game/Root"), &config);
        assert_eq!(v.status, VerdictStatus::NotApplicable);
    }

    #[test]
    fn budget_boundary_equality_passes() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let child = pkg("/Game/Child");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&child)]);
        asset(&mut g, &child, "Texture", Some(1_000), vec![]);

        assert_eq!(validate(&g, &root, &strict(1_000)).status, VerdictStatus::Pass);
        assert_eq!(validate(&g, &root, &strict(999)).status, VerdictStatus::Fail);

        let mut lax = strict(999);
        lax.strictness = Strictness::Warn;
        assert_eq!(validate(&g, &root, &lax).status, VerdictStatus::Warn);
    }

    #[test]
    fn four_megabyte_budget_scenario() {
        // root -> A (2,000,000) -> B (3,000,000); budget 4 MiB, strict.
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let a = pkg("/Game/A");
        let b = pkg("/Game/B");
        asset(&mut g, &root, "Blueprint", Some(123), vec![hard(&a)]);
        asset(&mut g, &a, "Mesh", Some(2_000_000), vec![hard(&b)]);
        asset(&mut g, &b, "Texture", Some(3_000_000), vec![]);

        let v = validate(&g, &root, &strict(4096 * 1024));
        assert_eq!(v.total_bytes, 5_000_000);
        assert_eq!(v.status, VerdictStatus::Fail);
    }

    #[test]
    fn validate_is_idempotent() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let a = pkg("/Game/A");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&a), hard(&root)]);
        asset(&mut g, &a, "Mesh", Some(123), vec![hard(&a)]);

        let config = strict(u64::MAX);
        let first = validate(&g, &root, &config);
        let second = validate(&g, &root, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn node_cap_truncates_with_partial_total() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let keys: Vec<AssetKey> = (0..10).map(|i| pkg(&format!("/Game/N{i}"))).collect();
        // A chain root -> N0 -> N1 -> ... -> N9, 100 bytes each.
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&keys[0])]);
        for i in 0..10 {
            let deps = if i + 1 < 10 { vec![hard(&keys[i + 1])] } else { vec![] };
            asset(&mut g, &keys[i], "Texture", Some(100), deps);
        }

        let mut config = strict(u64::MAX);
        config.max_nodes = Some(3);
        let capped = validate(&g, &root, &config);
        assert!(capped.truncated);
        assert_eq!(capped.visited, 3);
        // Root excluded, two chain nodes counted.
        assert_eq!(capped.total_bytes, 200);

        config.max_nodes = None;
        let full = validate(&g, &root, &config);
        assert!(!full.truncated);
        assert_eq!(full.total_bytes, 1_000);
        assert!(capped.total_bytes <= full.total_bytes);
    }

    #[test]
    fn registry_view_prunes_expansion() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Root");
        let inside = pkg("/Game/Inside");
        let outside = pkg("/Game/Outside");
        asset(&mut g, &root, "Blueprint", Some(1), vec![hard(&inside), hard(&outside)]);
        asset(&mut g, &inside, "Texture", Some(10), vec![]);
        asset(&mut g, &outside, "Texture", Some(90), vec![]);
        g.registry = Some([root.clone(), inside.clone()].into_iter().collect());

        let v = validate(&g, &root, &strict(u64::MAX));
        assert_eq!(v.total_bytes, 10);
    }

    #[test]
    fn size_map_rows_sum_to_total() {
        let mut g = AssetGraph::default();
        let root = pkg("/Game/Sword");
        let icon = pkg("/Game/Icon");
        let mesh = pkg("/Game/Mesh");
        g.insert(AssetRecord {
            key: root.clone(),
            class: "SwordDefinition".into(),
            ancestors: vec!["ItemDefinition".into()],
            size: Some(1),
            deps: vec![hard(&icon), hard(&mesh)],
        });
        g.insert(AssetRecord {
            key: icon.clone(),
            class: "IconTexture".into(),
            ancestors: vec!["Texture".into()],
            size: Some(700),
            deps: vec![],
        });
        asset(&mut g, &mesh, "Mesh", Some(300), vec![]);

        let mut config = strict(u64::MAX);
        config.ignore.scoped = vec![ScopedIgnore {
            root_class: "ItemDefinition".into(),
            classes: vec!["IconTexture".into()],
        }];

        let (verdict, rows) = size_map(&g, &root, &config);
        assert_eq!(verdict.total_bytes, 300);
        let counted: u64 = rows.iter().filter(|r| !r.ignored).map(|r| r.bytes).sum();
        assert_eq!(counted, verdict.total_bytes);
        // Suppressed bytes still show up in the map, flagged as ignored.
        let suppressed: Vec<_> = rows.iter().filter(|r| r.ignored).collect();
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].bytes, 700);
        // Sorted by contribution descending.
        assert!(rows.windows(2).all(|w| w[0].bytes >= w[1].bytes));
    }
}
