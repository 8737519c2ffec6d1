//! Traversal filtering for user-supplied paths
//!
//! The filter is deliberately narrow: it deletes the literal sequences `../`
//! and `/..` as they appear in the input and nothing else. It is a known-weak
//! defence. Nested sequences that only form after deletion (`....//`), percent
//! encoded dots, backslashes and symlink escapes all get through.

use std::path::{Path, PathBuf};

const TRAVERSAL_SEQUENCES: [&str; 2] = ["../", "/.."];

/// Delete every occurrence of `../` and `/..` from `raw`.
///
/// Both sequences are searched for in the original input during one scan and
/// every byte covered by a match is dropped, so overlapping matches vanish
/// together: `/dir/../secret` becomes `/dirsecret`. The output is not scanned
/// again.
pub fn sanitize(raw: &str) -> String {
    let mut covered = vec![false; raw.len()];
    for seq in TRAVERSAL_SEQUENCES {
        for (start, matched) in raw.match_indices(seq) {
            covered[start..start + matched.len()].fill(true);
        }
    }

    raw.char_indices()
        .filter(|(i, _)| !covered[*i])
        .map(|(_, c)| c)
        .collect()
}

/// Map a requested path onto `root`.
///
/// The request is sanitized, forced to start with `/` and appended to the
/// root as text, so an absolute request can never replace the root the way
/// [`Path::join`] would.
pub fn resolve(root: &Path, raw: &str) -> PathBuf {
    let mut relative = sanitize(raw);
    if !relative.starts_with('/') {
        relative.insert(0, '/');
    }

    let root = root.to_string_lossy();
    PathBuf::from(format!("{}{}", root.trim_end_matches('/'), relative))
}
