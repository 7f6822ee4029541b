//! Architectural Enforcement Integration Tests
//!
//! Source scans that keep the display engine honest:
//! - No thread sleeps in production code
//! - No blocking file I/O once the runtime is up
//! - The surface is only ever owned by the render coordinator
//! - No panicking shortcuts in library code
//!
//! This crate only holds the shared scanning helpers; the checks live in
//! `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("../.."))
}

/// Production source directories
#[must_use]
pub fn production_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    vec![root.join("chatface/core/src"), root.join("chatface/sim/src")]
}

/// All `.rs` files under `dir`
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// One line of production code
#[derive(Debug, Clone)]
pub struct CodeLine {
    /// File the line belongs to
    pub path: PathBuf,
    /// 1-based line number
    pub number: usize,
    /// Line text with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for CodeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// Non-comment lines of `path` that precede its `#[cfg(test)]` module
#[must_use]
pub fn production_lines(path: &Path) -> Vec<CodeLine> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| CodeLine {
            path: path.to_path_buf(),
            number: idx + 1,
            code: line.split("//").next().unwrap_or(line).to_string(),
        })
        .collect()
}

/// Production lines across every production directory matching `pred`
pub fn scan(pred: impl Fn(&CodeLine) -> bool) -> Vec<CodeLine> {
    production_dirs()
        .iter()
        .flat_map(|dir| rust_files(dir))
        .flat_map(|file| production_lines(&file))
        .filter(|line| pred(line))
        .collect()
}

/// Whether `line` lives in a file whose path ends with `suffix`
#[must_use]
pub fn in_file(line: &CodeLine, suffix: &str) -> bool {
    line.path.ends_with(suffix)
}
