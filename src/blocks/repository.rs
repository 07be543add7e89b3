//! Block storage: eager loading and category-indexed lookup.
//!
//! The repository is populated once (directory load or in-memory records)
//! and read-only afterwards, so concurrent compose calls need no locking.
//! Malformed entries are warned and skipped; the repository stays usable
//! with partial data.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::{Block, BlockCategory, BlockError};

/// Indexed store of reusable text blocks, keyed by `category/id`.
#[derive(Debug, Default)]
pub struct BlockRepository {
    by_key: HashMap<String, Block>,
    /// Keys per category, in discovery order.
    by_category: HashMap<BlockCategory, Vec<String>>,
}

impl BlockRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Eagerly load every `.json` file in a directory.
    ///
    /// Each file holds a JSON array of block records. A file that fails to
    /// parse, or an individual record that does not match the block shape,
    /// is logged as a warning and skipped; loading continues with whatever
    /// did parse.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::Io`] only when the directory itself cannot be
    /// read. Per-file and per-record failures are non-fatal.
    pub fn load_dir(path: impl AsRef<Path>) -> Result<Self, BlockError> {
        let mut repository = Self::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = match std::fs::read_to_string(&file_path) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!(file = %file_path.display(), error = %e, "skipping unreadable block file");
                    continue;
                }
            };
            match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
                Ok(records) => repository.insert_records(records),
                Err(e) => {
                    warn!(file = %file_path.display(), error = %e, "skipping unparseable block file");
                }
            }
        }
        debug!(blocks = repository.len(), "block repository loaded");
        Ok(repository)
    }

    /// Build a repository from in-memory JSON records (fixtures, tests,
    /// multi-tenant embedding). Malformed records are warned and skipped.
    pub fn from_records(records: Vec<serde_json::Value>) -> Self {
        let mut repository = Self::new();
        repository.insert_records(records);
        repository
    }

    fn insert_records(&mut self, records: Vec<serde_json::Value>) {
        for record in records {
            match serde_json::from_value::<Block>(record) {
                Ok(block) => self.insert(block),
                Err(e) => warn!(error = %e, "skipping malformed block record"),
            }
        }
    }

    /// Insert a block, replacing any earlier block with the same key.
    pub fn insert(&mut self, block: Block) {
        let key = block.key();
        if self.by_key.contains_key(&key) {
            warn!(key = %key, "duplicate block id, last definition wins");
        } else {
            self.by_category
                .entry(block.category)
                .or_default()
                .push(key.clone());
        }
        self.by_key.insert(key, block);
    }

    /// Look up a block by its `category/id` key.
    pub fn load(&self, key: &str) -> Option<&Block> {
        self.by_key.get(key)
    }

    /// All blocks in a category, in discovery order.
    pub fn by_category(&self, category: BlockCategory) -> Vec<&Block> {
        self.by_category
            .get(&category)
            .map(|keys| keys.iter().filter_map(|k| self.by_key.get(k)).collect())
            .unwrap_or_default()
    }

    /// Number of blocks held.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the repository holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Per-category block counts, in assembly order (diagnostics).
    pub fn category_counts(&self) -> Vec<(BlockCategory, usize)> {
        BlockCategory::ORDERED
            .into_iter()
            .map(|c| (c, self.by_category.get(&c).map_or(0, Vec::len)))
            .collect()
    }
}
