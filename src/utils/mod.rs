pub mod table {
    // Helper to render a separator line
    fn sep(widths: &[usize]) -> String {
        let mut s = String::from("+");
        for w in widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s
    }

    // Helper to render a row line
    fn line(cells: &[String], widths: &[usize]) -> String {
        let mut s = String::from("|");
        for (i, cell) in cells.iter().enumerate() {
            let w = widths[i];
            s.push(' ');
            s.push_str(cell);
            if cell.len() < w {
                s.push_str(&" ".repeat(w - cell.len()));
            }
            s.push(' ');
            s.push('|');
        }
        s
    }

    /// Render a simple ASCII table given headers and rows.
    pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
        let cols = headers.len();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (c, w) in widths.iter_mut().enumerate().take(cols) {
                *w = (*w).max(row.get(c).map_or(0, String::len));
            }
        }

        let mut out = String::new();
        out.push_str(&sep(&widths));
        out.push('\n');
        let header_cells: Vec<String> = headers.iter().map(|s| (*s).to_string()).collect();
        out.push_str(&line(&header_cells, &widths));
        out.push('\n');
        out.push_str(&sep(&widths));
        out.push('\n');
        for row in rows {
            let mut cells = Vec::with_capacity(cols);
            for i in 0..cols {
                cells.push(row.get(i).cloned().unwrap_or_default());
            }
            out.push_str(&line(&cells, &widths));
            out.push('\n');
        }
        out.push_str(&sep(&widths));
        out
    }
}

pub mod bytes {
    /// Format a byte count for humans: exact bytes up to 1 KiB, one decimal
    /// of KiB/MiB/GiB above that, with the exact count in parentheses so
    /// budget comparisons stay checkable.
    #[must_use]
    pub fn human(n: u64) -> String {
        const KIB: u64 = 1024;
        const MIB: u64 = 1024 * KIB;
        const GIB: u64 = 1024 * MIB;
        #[allow(clippy::cast_precision_loss)]
        let scaled = |unit: u64| n as f64 / unit as f64;
        if n >= GIB {
            format!("{:.1} GiB ({n} bytes)", scaled(GIB))
        } else if n >= MIB {
            format!("{:.1} MiB ({n} bytes)", scaled(MIB))
        } else if n >= KIB {
            format!("{:.1} KiB ({n} bytes)", scaled(KIB))
        } else {
            format!("{n} bytes")
        }
    }
}

pub mod config {
    use serde::Deserialize;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::graph::DependencyQuery;
    use crate::policy::IgnoreRules;
    use crate::validator::{Strictness, ValidationConfig};

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct QuerySection {
        pub package: Option<DependencyQuery>,
        pub primary: Option<DependencyQuery>,
    }

    /// On-disk configuration (`refweight.toml`). Every field is optional;
    /// unset fields keep the defaults of `ValidationConfig`.
    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Config {
        pub enabled: Option<bool>,
        pub max_kilobytes: Option<u64>,
        pub strictness: Option<String>, // "warn" | "error"
        pub code_prefixes: Option<Vec<String>>,
        pub max_nodes: Option<usize>,
        pub ignore: Option<IgnoreRules>,
        pub query: Option<QuerySection>,
    }

    impl Config {
        /// Overlay this file's values onto a base validation config.
        #[must_use]
        pub fn apply(self, mut base: ValidationConfig) -> ValidationConfig {
            if let Some(v) = self.enabled {
                base.enabled = v;
            }
            if let Some(kb) = self.max_kilobytes {
                base.max_bytes = kb.saturating_mul(1024);
            }
            if let Some(s) = self.strictness {
                base.strictness = parse_strictness(&s).unwrap_or(base.strictness);
            }
            if let Some(p) = self.code_prefixes {
                base.code_prefixes = p;
            }
            if let Some(n) = self.max_nodes {
                base.max_nodes = Some(n);
            }
            if let Some(ignore) = self.ignore {
                base.ignore = ignore;
            }
            if let Some(query) = self.query {
                if let Some(q) = query.package {
                    base.query.package = q;
                }
                if let Some(q) = query.primary {
                    base.query.primary = q;
                }
            }
            base
        }
    }

    #[must_use]
    pub fn parse_strictness(s: &str) -> Option<Strictness> {
        match s {
            "warn" => Some(Strictness::Warn),
            "error" => Some(Strictness::Error),
            _ => None,
        }
    }

    fn default_config_path(root: &Path) -> PathBuf {
        root.join("refweight.toml")
    }

    #[must_use]
    pub fn load_config_at(path: &Path) -> Option<Config> {
        let data = fs::read_to_string(path).ok()?;
        toml::from_str::<Config>(&data).ok()
    }

    #[must_use]
    pub fn load_config_near(root: &Path) -> Option<Config> {
        let p = default_config_path(root);
        if p.exists() {
            load_config_at(&p)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_renders_headers_and_rows() {
        let out = table::render(
            &["Asset", "Size"],
            &[vec!["/Game/A".to_string(), "10 bytes".to_string()]],
        );
        assert!(out.contains("Asset"));
        assert!(out.contains("/Game/A"));
        assert!(out.starts_with('+'));
    }

    #[test]
    fn human_bytes_scales() {
        assert_eq!(bytes::human(10), "10 bytes");
        assert_eq!(bytes::human(2048), "2.0 KiB (2048 bytes)");
        assert!(bytes::human(5_000_000).starts_with("4.8 MiB"));
    }
}
