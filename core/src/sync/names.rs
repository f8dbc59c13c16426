//! Logical asset names.
//!
//! The server stores uploads with a bracketed timestamp token
//! (`name [2024-01-01_00-00-00].srm`, or `...-00-1]` for same-second
//! duplicates). Reconciliation compares names with those tokens removed.

use std::sync::LazyLock;

use regex::Regex;

static TIMESTAMP_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}(?:-\d+)?\]")
        .expect("timestamp token pattern is valid")
});

/// Strip every embedded timestamp token from a server filename.
pub fn logical_name(server_file_name: &str) -> String {
    TIMESTAMP_TOKEN
        .replace_all(server_file_name, "")
        .trim()
        .to_string()
}
