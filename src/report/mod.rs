//! Rendering of verdicts and size maps.
//!
//! This is the reporting boundary: pure formatting over `Verdict` and
//! `SizeRow`, no I/O. The CLI decides where the output goes; an editor
//! integration would consume the same structures to build its own
//! diagnostics.
use crate::utils::{bytes, table};
use crate::validator::{SizeRow, Verdict, VerdictStatus};

/// One-line human diagnostic for a verdict, in the shape
/// `"<status>: <root>: <total> of <budget>"`. Overflowing verdicts lead with
/// the heavy-references warning so the message reads like the problem, not
/// the bookkeeping.
#[must_use]
pub fn render_text(verdict: &Verdict, max_bytes: u64) -> String {
    let mut out = match verdict.status {
        VerdictStatus::NotApplicable => {
            return format!("not-applicable: {}", verdict.root);
        }
        VerdictStatus::Pass => format!(
            "pass: {}: {} of {}",
            verdict.root,
            bytes::human(verdict.total_bytes),
            bytes::human(max_bytes)
        ),
        VerdictStatus::Warn | VerdictStatus::Fail => format!(
            "{}: heavy references in asset {}: {} exceeds budget {}",
            verdict.status,
            verdict.root,
            bytes::human(verdict.total_bytes),
            bytes::human(max_bytes)
        ),
    };
    if verdict.truncated {
        out.push_str(&format!(" (truncated after {} nodes; total is a lower bound)", verdict.visited));
    }
    out
}

/// Pretty-printed JSON for one or more verdicts.
///
/// # Errors
/// Returns a `serde_json` error if serialization fails.
pub fn render_json(verdicts: &[Verdict]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(verdicts)
}

/// ASCII table of size-map rows: key, class, bytes, ignored marker.
#[must_use]
pub fn render_rows_table(rows: &[SizeRow]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.key.to_string(),
                r.class.clone(),
                bytes::human(r.bytes),
                if r.ignored { "ignored".to_string() } else { String::new() },
            ]
        })
        .collect();
    table::render(&["Asset", "Class", "Size", ""], &body)
}

/// Pretty-printed JSON for size-map rows.
///
/// # Errors
/// Returns a `serde_json` error if serialization fails.
pub fn render_rows_json(rows: &[SizeRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AssetKey;

    fn verdict(status: VerdictStatus, total: u64) -> Verdict {
        Verdict {
            status,
            total_bytes: total,
            visited: 3,
            truncated: false,
            root: AssetKey::Package("/Game/Root".into()),
        }
    }

    #[test]
    fn text_mentions_root_and_budget_on_overflow() {
        let text = render_text(&verdict(VerdictStatus::Fail, 5_000_000), 4096 * 1024);
        assert!(text.starts_with("fail:"));
        assert!(text.contains("/Game/Root"));
        assert!(text.contains("heavy references"));
    }

    #[test]
    fn text_marks_truncated_totals() {
        let mut v = verdict(VerdictStatus::Warn, 10);
        v.truncated = true;
        let text = render_text(&v, 5);
        assert!(text.contains("lower bound"));
    }

    #[test]
    fn not_applicable_has_no_totals() {
        let text = render_text(&verdict(VerdictStatus::NotApplicable, 0), 1024);
        assert_eq!(text, "not-applicable: /Game/Root");
    }

    #[test]
    fn json_round_trips_status() {
        let out = render_json(&[verdict(VerdictStatus::Pass, 42)]).unwrap();
        let parsed: Vec<Verdict> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0].status, VerdictStatus::Pass);
        assert_eq!(parsed[0].total_bytes, 42);
    }

    #[test]
    fn rows_table_flags_ignored_entries() {
        let rows = vec![
            SizeRow {
                key: AssetKey::Package("/Game/Icon".into()),
                class: "IconTexture".into(),
                bytes: 700,
                ignored: true,
            },
            SizeRow {
                key: AssetKey::Package("/Game/Mesh".into()),
                class: "Mesh".into(),
                bytes: 300,
                ignored: false,
            },
        ];
        let table = render_rows_table(&rows);
        assert!(table.contains("/Game/Icon"));
        assert!(table.contains("ignored"));
        assert!(table.contains("Mesh"));
    }
}
