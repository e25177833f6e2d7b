//! Conversion between the switch's structured command-tree JSON and
//! linear CLI text, plus the two distinct comparison primitives: a
//! positional line diff and an order-insensitive change summary.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Keys inside a command node that hold metadata, not sub-commands
const METADATA_KEYS: &[&str] = &["cmds", "comments"];

const INDENT: &str = "   ";

/// Convert a nested command/subcommand tree into ordered CLI text.
///
/// Each non-metadata key is one command line at 3 spaces per depth. A
/// node with real sub-commands (a `cmds` array/object or additional
/// non-metadata keys) is followed by its children and then a bare `!`;
/// a childless top-level command also gets a trailing `!`. Downstream
/// config parsers depend on this exact separator placement, so it is
/// preserved as-is even though it looks like a recursion artifact.
pub fn structured_to_text(tree: &Value) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(header) = tree.get("header").and_then(Value::as_array) {
        for h in header {
            if let Some(s) = h.as_str() {
                lines.push(s.to_string());
            }
        }
    }

    // The device wraps top-level commands in a "cmds" object; tolerate
    // trees that put commands directly at the root as well.
    if let Some(root) = tree.get("cmds").and_then(Value::as_object) {
        walk(root, 0, &mut lines);
    } else if let Some(root) = tree.as_object() {
        walk(root, 0, &mut lines);
    }

    // Look past trailing separators: a childless "end" key is followed
    // by its own "!" line.
    let has_end = lines
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|t| !t.is_empty() && *t != "!")
        .map(|t| t == "end")
        .unwrap_or(false);
    if !has_end {
        lines.push("end".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn walk(node: &Map<String, Value>, depth: usize, out: &mut Vec<String>) {
    for (key, value) in node {
        if key == "header" || METADATA_KEYS.contains(&key.as_str()) {
            continue;
        }

        out.push(format!("{}{}", INDENT.repeat(depth), key));

        if has_subcommands(value) {
            emit_children(value, depth + 1, out);
            out.push("!".to_string());
        } else if depth == 0 {
            out.push("!".to_string());
        }
    }
}

fn has_subcommands(value: &Value) -> bool {
    let obj = match value.as_object() {
        Some(o) => o,
        None => return false,
    };

    match obj.get("cmds") {
        Some(Value::Array(a)) if !a.is_empty() => return true,
        Some(Value::Object(m)) if !m.is_empty() => return true,
        _ => {}
    }

    obj.keys().any(|k| !METADATA_KEYS.contains(&k.as_str()))
}

fn emit_children(value: &Value, depth: usize, out: &mut Vec<String>) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => return,
    };

    match obj.get("cmds") {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(s) = item.as_str() {
                    out.push(format!("{}{}", INDENT.repeat(depth), s));
                }
            }
        }
        Some(Value::Object(cmds)) => walk(cmds, depth, out),
        _ => {}
    }

    // Additional non-metadata keys are sub-commands too
    walk(obj, depth, out);
}

/// One row of a positional diff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub line: usize,
    pub change_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<String>,
}

/// Canonical change classifications
pub mod change_type {
    pub const UNCHANGED: &str = "unchanged";
    pub const ADDED: &str = "added";
    pub const REMOVED: &str = "removed";
    pub const MODIFIED: &str = "modified";
}

/// Positional diff result with per-category counts
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDiff {
    pub entries: Vec<DiffEntry>,
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// Line-by-line positional comparison: line i of `a` against line i of
/// `b` after trimming. Deliberately order-sensitive and not an LCS;
/// one inserted line shifts everything after it to `modified`.
pub fn diff_lines(a: &str, b: &str) -> ConfigDiff {
    let a_lines: Vec<&str> = a.lines().map(str::trim).collect();
    let b_lines: Vec<&str> = b.lines().map(str::trim).collect();
    let len = a_lines.len().max(b_lines.len());

    let mut diff = ConfigDiff {
        entries: Vec::with_capacity(len),
        unchanged: 0,
        added: 0,
        removed: 0,
        modified: 0,
    };

    for i in 0..len {
        let old = a_lines.get(i).copied();
        let new = b_lines.get(i).copied();
        let (change, old_line, new_line) = match (old, new) {
            (Some(o), Some(n)) if o == n => {
                diff.unchanged += 1;
                (change_type::UNCHANGED, Some(o), Some(n))
            }
            (Some(o), Some(n)) => {
                diff.modified += 1;
                (change_type::MODIFIED, Some(o), Some(n))
            }
            (None, Some(n)) => {
                diff.added += 1;
                (change_type::ADDED, None, Some(n))
            }
            (Some(o), None) => {
                diff.removed += 1;
                (change_type::REMOVED, Some(o), None)
            }
            (None, None) => unreachable!(),
        };
        diff.entries.push(DiffEntry {
            line: i + 1,
            change_type: change.to_string(),
            old_line: old_line.map(str::to_string),
            new_line: new_line.map(str::to_string),
        });
    }

    diff
}

/// Order-insensitive change statistics, computed via set difference of
/// trimmed non-empty lines. Distinct from `diff_lines`; callers must
/// not mix the two statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSummary {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub size_before: usize,
    pub size_after: usize,
}

pub fn change_summary(old: &str, new: &str) -> ChangeSummary {
    let old_set: HashSet<&str> = old.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let new_set: HashSet<&str> = new.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    ChangeSummary {
        lines_added: new_set.difference(&old_set).count(),
        lines_removed: old_set.difference(&new_set).count(),
        size_before: old.len(),
        size_after: new.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_childless_top_level_gets_separator() {
        let tree = json!({"cmds": {"hostname sw1": null}});
        assert_eq!(structured_to_text(&tree), "hostname sw1\n!\nend\n");
    }

    #[test]
    fn test_node_with_children_single_trailing_separator() {
        let tree = json!({
            "cmds": {
                "vlan 10": {"cmds": {"name Servers": null}}
            }
        });
        // Key line, children, then exactly one "!", never both forms
        assert_eq!(
            structured_to_text(&tree),
            "vlan 10\n   name Servers\n!\nend\n"
        );
    }

    #[test]
    fn test_cmds_array_children() {
        let tree = json!({
            "cmds": {
                "interface Ethernet1": {"cmds": ["description uplink", "switchport access vlan 10"]}
            }
        });
        assert_eq!(
            structured_to_text(&tree),
            "interface Ethernet1\n   description uplink\n   switchport access vlan 10\n!\nend\n"
        );
    }

    #[test]
    fn test_header_emitted_first() {
        let tree = json!({
            "header": ["! Command: show running-config", "! device: sw1"],
            "cmds": {"hostname sw1": null}
        });
        let text = structured_to_text(&tree);
        assert!(text.starts_with("! Command: show running-config\n! device: sw1\nhostname sw1"));
    }

    #[test]
    fn test_end_not_duplicated() {
        let tree = json!({"cmds": {"hostname sw1": null, "end": null}});
        let text = structured_to_text(&tree);
        assert_eq!(text.matches("end").count(), 1);
        // The childless "end" key still carries its top-level separator
        assert_eq!(text, "hostname sw1\n!\nend\n!\n");
    }

    #[test]
    fn test_nested_depth_indentation() {
        let tree = json!({
            "cmds": {
                "router bgp 65000": {
                    "cmds": {
                        "address-family ipv4": {
                            "cmds": {"neighbor 10.0.0.1 activate": null}
                        }
                    }
                }
            }
        });
        let text = structured_to_text(&tree);
        assert!(text.contains("router bgp 65000\n   address-family ipv4\n      neighbor 10.0.0.1 activate"));
    }

    #[test]
    fn test_diff_lines_modification_and_addition() {
        let a = "int e1\nvlan 10";
        let b = "int e1\nvlan 20\nshutdown";
        let diff = diff_lines(a, b);

        assert_eq!(diff.entries[0].change_type, "unchanged");
        assert_eq!(diff.entries[1].change_type, "modified");
        assert_eq!(diff.entries[1].old_line.as_deref(), Some("vlan 10"));
        assert_eq!(diff.entries[1].new_line.as_deref(), Some("vlan 20"));
        assert_eq!(diff.entries[2].change_type, "added");
        assert_eq!(diff.entries[2].new_line.as_deref(), Some("shutdown"));

        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.modified, 1);
        assert_eq!(diff.added, 1);
        assert_eq!(diff.removed, 0);
    }

    #[test]
    fn test_diff_lines_positional_symmetry() {
        let a = "int e1\nvlan 10";
        let b = "int e1\nvlan 20\nshutdown";
        let fwd = diff_lines(a, b);
        let rev = diff_lines(b, a);

        assert_eq!(fwd.unchanged, rev.unchanged);
        assert_eq!(fwd.modified, rev.modified);
        assert_eq!(fwd.added, rev.removed);
        assert_eq!(fwd.removed, rev.added);

        // Modified entries swap old/new
        assert_eq!(fwd.entries[1].old_line, rev.entries[1].new_line);
        assert_eq!(fwd.entries[1].new_line, rev.entries[1].old_line);
        // The added row becomes removed
        assert_eq!(rev.entries[2].change_type, "removed");
        assert_eq!(rev.entries[2].old_line.as_deref(), Some("shutdown"));
    }

    #[test]
    fn test_diff_lines_trims_whitespace() {
        let diff = diff_lines("  vlan 10  ", "vlan 10");
        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.modified, 0);
    }

    #[test]
    fn test_diff_insertion_shifts_everything() {
        // One inserted line turns every later comparison into modified
        let a = "a\nb\nc";
        let b = "x\na\nb\nc";
        let diff = diff_lines(a, b);
        assert_eq!(diff.unchanged, 0);
        assert_eq!(diff.modified, 3);
        assert_eq!(diff.added, 1);
    }

    #[test]
    fn test_change_summary_is_order_insensitive() {
        let old = "vlan 10\nvlan 20\n";
        let new = "vlan 20\nvlan 10\nvlan 30\n";
        let summary = change_summary(old, new);
        assert_eq!(summary.lines_added, 1);
        assert_eq!(summary.lines_removed, 0);
        assert_eq!(summary.size_before, old.len());
        assert_eq!(summary.size_after, new.len());
    }

    #[test]
    fn test_change_summary_ignores_blank_lines() {
        let summary = change_summary("a\n\n\nb", "a\nb");
        assert_eq!(summary.lines_added, 0);
        assert_eq!(summary.lines_removed, 0);
    }
}
