//! Configuration for heapkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Configuration for a single [`Store`](crate::Store) instance
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the heap file. The whole store lives in this one file.
    pub path: PathBuf,

    /// Create the heap file if it does not exist
    pub create_if_missing: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync after appends
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy for appended records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// Flush every write, fsync after N writes
    EveryNWrites { count: usize },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./heap.db"),
            create_if_missing: true,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the heap file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Whether a missing heap file should be created on open
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
