//! Resolution of image storage keys to bytes.

use crate::common::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Turns the storage key held by an image placeholder's data value into
/// image bytes.
///
/// Failures are reported as [`Error::AssetUnavailable`]; the renderer
/// contains them to the one placeholder being resolved.
pub trait AssetResolver {
    fn resolve(&self, key: &str) -> Result<Vec<u8>>;
}

impl<F> AssetResolver for F
where
    F: Fn(&str) -> Result<Vec<u8>>,
{
    fn resolve(&self, key: &str) -> Result<Vec<u8>> {
        self(key)
    }
}

/// A resolver that knows no keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn resolve(&self, key: &str) -> Result<Vec<u8>> {
        Err(Error::asset_unavailable(key, "no asset store configured"))
    }
}

/// Assets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.insert(key.into(), bytes.into());
    }

    pub fn with(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(key, bytes);
        self
    }
}

impl AssetResolver for MemoryAssets {
    fn resolve(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(key)
            .cloned()
            .ok_or_else(|| Error::asset_unavailable(key, "no such key"))
    }
}

/// Assets stored as files under a root directory, keyed by relative path.
///
/// Keys that are absolute or step outside the root are refused.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || !confined {
            return Err(Error::asset_unavailable(key, "key escapes the asset directory"));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetResolver for DirectoryAssets {
    fn resolve(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| Error::asset_unavailable(key, e))
    }
}
