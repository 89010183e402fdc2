//! Filesystem utilities for the routing archive.
//!
//! The archive is a directory tree whose fourth level holds the routing
//! endpoints (`year/domain/topic/folder`). This module lists those endpoints,
//! renders the full tree, derives final file names for routed documents, and
//! performs the move/mkdir operations the workflow engine requests.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use walkdir::WalkDir;

/// Depth below the root at which routing endpoints live.
const ENDPOINT_DEPTH: usize = 4;

/// Longest sanitized file-name component.
const MAX_COMPONENT_CHARS: usize = 80;

/// Errors raised by archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A non-empty relative destination path is required.
    #[error("a relative destination path is required")]
    MissingPath,
    /// The file to move does not exist.
    #[error("source file not found: {}", .0.display())]
    SourceMissing(PathBuf),
    /// Walking the archive tree failed partway.
    #[error("archive scan failed: {0}")]
    Scan(String),
    /// Underlying filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One directory in the archive tree.
#[derive(Debug, Serialize)]
pub struct ArchiveNode {
    /// Directory name.
    pub name: String,
    /// Path relative to the archive root with `/` separators; empty for the root.
    pub path_rel: String,
    /// Child directories, sorted case-insensitively.
    pub children: Vec<ArchiveNode>,
}

/// Destination derived for a routed document.
#[derive(Debug, Serialize)]
pub struct RoutePlan {
    /// Normalized relative destination inside the archive.
    pub final_rel_path: String,
    /// Absolute destination directory.
    pub final_path: String,
    /// Date-prefixed, sanitized file name.
    pub final_name: String,
}

/// Archive operations rooted at a fixed directory.
pub struct ArchiveService {
    root: PathBuf,
}

impl ArchiveService {
    /// Create a service over `root`. The directory may not exist yet.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// List routing endpoints: directories exactly [`ENDPOINT_DEPTH`] levels
    /// below the root, as `/`-joined relative paths. A missing root yields an
    /// empty list.
    pub fn list_endpoints(&self) -> Result<Vec<String>, ArchiveError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut endpoints = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(ENDPOINT_DEPTH)
            .max_depth(ENDPOINT_DEPTH)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| ArchiveError::Scan(err.to_string()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|err| ArchiveError::Scan(err.to_string()))?;
            endpoints.push(rel_to_slashes(rel));
        }
        Ok(endpoints)
    }

    /// Render the directory tree below the root, or below `override_root`
    /// when given. Returns `None` when the directory does not exist.
    pub fn build_tree(&self, override_root: Option<&Path>) -> Option<ArchiveNode> {
        let base = override_root.unwrap_or(&self.root);
        if !base.is_dir() {
            return None;
        }
        Some(tree_node(base, base))
    }

    /// Derive the final directory and file name for a routed document.
    pub fn apply_route(&self, inbox_name: &str, selected_path: &str) -> Result<RoutePlan, ArchiveError> {
        let rel = normalize_rel(selected_path).ok_or(ArchiveError::MissingPath)?;
        let final_dir = self.root.join(rel.split('/').collect::<PathBuf>());

        let stem = match inbox_name.trim() {
            "" => "document",
            name => name.rsplit_once('.').map_or(name, |(stem, _)| stem),
        };
        let final_name = format!("{}__{}.pdf", today_iso(), safe_component(stem));

        Ok(RoutePlan {
            final_rel_path: rel,
            final_path: final_dir.display().to_string(),
            final_name,
        })
    }

    /// Move `src` into `dest_dir` (created if absent) under a sanitized
    /// `dest_name`, returning the destination path.
    pub fn move_file(
        &self,
        src: &Path,
        dest_dir: &Path,
        dest_name: &str,
    ) -> Result<PathBuf, ArchiveError> {
        if !src.exists() {
            return Err(ArchiveError::SourceMissing(src.to_path_buf()));
        }
        std::fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(replace_reserved(dest_name));

        // Same-filesystem rename first; fall back to copy+delete across mounts.
        if std::fs::rename(src, &dest).is_err() {
            std::fs::copy(src, &dest)?;
            std::fs::remove_file(src)?;
        }
        Ok(dest)
    }

    /// Create a directory below the root from a `/`-separated relative path.
    pub fn make_dir(&self, rel_path: &str) -> Result<PathBuf, ArchiveError> {
        let rel = normalize_rel(rel_path).ok_or(ArchiveError::MissingPath)?;
        let dest = self.root.join(rel.split('/').collect::<PathBuf>());
        std::fs::create_dir_all(&dest)?;
        Ok(dest)
    }
}

/// Sanitize a file-name component: strip whitespace, replace path and
/// filesystem-reserved characters with `_`, cap the length.
pub fn safe_component(value: &str) -> String {
    replace_reserved(value.trim())
        .chars()
        .take(MAX_COMPONENT_CHARS)
        .collect()
}

fn replace_reserved(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn normalize_rel(path: &str) -> Option<String> {
    let rel = path.trim().replace('\\', "/");
    let rel = rel.trim_matches('/');
    if rel.is_empty() {
        None
    } else {
        Some(rel.to_string())
    }
}

fn rel_to_slashes(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn tree_node(node: &Path, base: &Path) -> ArchiveNode {
    let mut children: Vec<PathBuf> = std::fs::read_dir(node)
        .into_iter()
        .flatten()
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.path())
        .collect();
    children.sort_by_key(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });

    ArchiveNode {
        name: node
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path_rel: node
            .strip_prefix(base)
            .map(rel_to_slashes)
            .unwrap_or_default(),
        children: children
            .iter()
            .map(|child| tree_node(child, base))
            .collect(),
    }
}

fn today_iso() -> String {
    let date = OffsetDateTime::now_utc().date();
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
