//! Testing utilities for the connswitch workspace
//!
//! Shared fixture files and temp-directory helpers.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// JSON with `// Azure Dev|QA|Prod` blocks; the Prod block is active
pub const APPSETTINGS_BLOCKS: &str = include_str!("fixtures/appsettings.blocks.json");

/// JSON with one `<Env>Connection` key per environment
pub const APPSETTINGS_TREE: &str = include_str!("fixtures/appsettings.json");

/// XML with Development and Production `<add>` entries and no `DefaultConnection`
pub const WEB_CONFIG: &str = include_str!("fixtures/web.config");

/// Temp directory holding fixture files; removed on drop
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the directory
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        write_fixture(self.dir.path(), name, content)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("read fixture")
    }

    /// Sorted file names currently in the directory
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("read temp dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}
