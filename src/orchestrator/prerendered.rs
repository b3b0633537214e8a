//! Prerendered asset lookup.
//!
//! # Responsibilities
//! - Hold the set of paths produced by the static prerender step
//! - Resolve a request path to one of those paths
//! - Read a resolved asset from local storage
//!
//! # Design Decisions
//! - Membership is exact string match; no filesystem probing per request
//! - The set is fixed at construction and never changes

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AdapterError, AdapterResult};

/// Cache directive attached to prerendered pages served by the adapter.
pub const PRERENDERED_CACHE_CONTROL: &str = "public, max-age=0, s-maxage=31536000, must-revalidate";

/// Known prerendered files and the directory they live under.
#[derive(Debug, Clone, Default)]
pub struct PrerenderedAssets {
    root: PathBuf,
    files: HashSet<String>,
}

impl PrerenderedAssets {
    pub fn new<I, S>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set: every request goes to the handler.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolve a request path to a prerendered file, if one exists.
    ///
    /// One leading and one trailing slash are stripped, then the candidates
    /// are tried in order: `index.html` for the empty path, the path itself,
    /// `<path>/index.html`, `<path>.html`.
    pub fn resolve(&self, raw_path: &str) -> Option<String> {
        let path = raw_path.strip_prefix('/').unwrap_or(raw_path);
        let path = path.strip_suffix('/').unwrap_or(path);

        if path.is_empty() {
            return self.contains("index.html").then(|| "index.html".to_string());
        }

        [
            path.to_string(),
            format!("{path}/index.html"),
            format!("{path}.html"),
        ]
        .into_iter()
        .find(|candidate| self.contains(candidate))
    }

    /// Read a resolved asset as UTF-8 text.
    pub fn read(&self, file: &str) -> AdapterResult<String> {
        let path = self.root.join(file);
        fs::read_to_string(&path).map_err(|source| AdapterError::AssetRead { path, source })
    }
}
