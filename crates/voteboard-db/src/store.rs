use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{VoteboardError, VoteboardResult};
use crate::feature::{Feature, NewFeature};

/// Synchronized accessor over the JSON document holding all feature
/// requests. Every operation performs a fresh load from disk; mutations
/// rewrite the whole document through an atomic temp-then-rename save, so
/// readers only ever observe a fully-old or fully-new collection.
///
/// The lock is scoped to this instance. Running more than one process
/// against the same backing file is unsupported.
pub struct FeatureStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FeatureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all features in insertion order. An absent or empty backing
    /// file is an empty collection, not an error.
    pub fn list(&self) -> VoteboardResult<Vec<Feature>> {
        let _guard = self.lock.read();
        self.load()
    }

    /// Validates the candidate, assigns identifier and creation timestamp,
    /// and appends it to the collection. Nothing is written when validation
    /// fails.
    pub fn add(&self, request: NewFeature) -> VoteboardResult<Feature> {
        request.validated()?;
        let feature = Feature::new(request);

        let _guard = self.lock.write();
        let mut features = self.load()?;
        features.push(feature.clone());
        self.save(&features)?;
        Ok(feature)
    }

    /// Increments the vote count of the feature with the given id. Fails
    /// with `NotFound` before any write when the id does not exist.
    pub fn vote(&self, id: &str) -> VoteboardResult<()> {
        let _guard = self.lock.write();
        let mut features = self.load()?;
        let feature = features
            .iter_mut()
            .find(|feature| feature.id == id)
            .ok_or_else(|| VoteboardError::NotFound(id.to_string()))?;
        feature.votes += 1;
        self.save(&features)
    }

    fn load(&self) -> VoteboardResult<Vec<Feature>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| VoteboardError::Io(err.to_string()))?;
        }
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw =
            fs::read_to_string(&self.path).map_err(|err| VoteboardError::Io(err.to_string()))?;
        // An interrupted save can legitimately leave an empty file behind;
        // only non-empty malformed content is a decode failure.
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|err| VoteboardError::Decode(err.to_string()))
    }

    fn save(&self, features: &[Feature]) -> VoteboardResult<()> {
        let data = serde_json::to_vec_pretty(features)
            .map_err(|err| VoteboardError::Internal(err.to_string()))?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, data).map_err(|err| VoteboardError::Io(err.to_string()))?;
        fs::rename(&temp_path, &self.path).map_err(|err| VoteboardError::Io(err.to_string()))
    }
}
