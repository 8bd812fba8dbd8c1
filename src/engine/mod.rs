use std::{
    sync::{Arc, Mutex, RwLock},
    time::Instant,
};

use crate::{
    config::EngineConfig,
    dataset::Dataset,
    error::{EngineError, Result},
    index::{Recommendation, SimilarityIndex},
    store::{ArtifactStore, Manifest},
};

struct CachedIndex {
    /// manifest the snapshot was loaded from
    manifest: Manifest,
    index: Arc<SimilarityIndex>,
}

/// Trains and queries the similarity index in `EngineConfig::index_dir`.
///
/// Trainings in one process are serialized. Queries run against an immutable
/// snapshot, so a query never sees a half-replaced index. The snapshot is
/// checked against the on-disk manifest and reloaded when another process
/// has trained since.
pub struct ContentEngine {
    config: EngineConfig,
    store: ArtifactStore,
    cache: RwLock<Option<CachedIndex>>,
    train_lock: Mutex<()>,
}

fn poisoned<T>(what: &'static str) -> impl FnOnce(T) -> EngineError {
    move |_| EngineError::LockPoisoned(what.to_string())
}

impl ContentEngine {
    pub fn new(config: EngineConfig) -> Self {
        let store = ArtifactStore::new(config.index_dir.clone());
        Self {
            config,
            store,
            cache: RwLock::new(None),
            train_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Rebuild the index from `source` (path or URL) and persist it.
    pub fn train(&self, source: &str) -> Result<()> {
        self.train_with_manifest(source).map(|_| ())
    }

    /// `train`, returning the manifest of the new generation.
    pub fn train_with_manifest(&self, source: &str) -> Result<Manifest> {
        let _guard = self.train_lock.lock().map_err(poisoned("train"))?;

        let start = Instant::now();
        let dataset = Dataset::load(source)?;
        tracing::info!(
            source,
            rows = dataset.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "data source ingested"
        );

        let start = Instant::now();
        let index = SimilarityIndex::build(dataset, self.config.vectorizer.clone())?;
        tracing::info!(
            rows = index.len(),
            vocab = index.vectorizer().vocab_size(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index trained"
        );

        let manifest = self.store.save(&index)?;
        let mut cache = self.cache.write().map_err(poisoned("cache"))?;
        *cache = Some(CachedIndex {
            manifest: manifest.clone(),
            index: Arc::new(index),
        });
        Ok(manifest)
    }

    /// Top `num` documents for `content`. `num <= 0` gives an empty list.
    pub fn recommend(&self, content: &str, num: i64) -> Result<Vec<Recommendation>> {
        let index = self.index()?;
        let recs = index.recommend(content, num);
        tracing::debug!(num, returned = recs.len(), "recommend");
        Ok(recs)
    }

    /// `recommend` with `EngineConfig::default_num`
    pub fn recommend_default(&self, content: &str) -> Result<Vec<Recommendation>> {
        self.recommend(content, self.config.default_num)
    }

    /// Snapshot of the latest completed index
    ///
    /// The cached snapshot is reused only while the on-disk manifest is the
    /// one it was loaded from. Generations restart when the directory is
    /// wiped, so the whole manifest is compared, digests and timestamp included.
    pub fn index(&self) -> Result<Arc<SimilarityIndex>> {
        let Some(on_disk) = self.store.read_manifest()? else {
            return Err(EngineError::IndexNotFound {
                path: self.store.dir().to_path_buf(),
            });
        };

        {
            let cache = self.cache.read().map_err(poisoned("cache"))?;
            if let Some(cached) = cache.as_ref() {
                if cached.manifest == on_disk {
                    return Ok(Arc::clone(&cached.index));
                }
                tracing::warn!(
                    cached = cached.manifest.generation,
                    on_disk = on_disk.generation,
                    "index changed on disk, reloading"
                );
            }
        }

        let (manifest, index) = self.load_settled()?;
        let index = Arc::new(index);
        let mut cache = self.cache.write().map_err(poisoned("cache"))?;
        *cache = Some(CachedIndex {
            manifest,
            index: Arc::clone(&index),
        });
        Ok(index)
    }

    /// Load, retrying while trainings elsewhere replace the set mid-read.
    /// Each retry follows a newly completed training.
    fn load_settled(&self) -> Result<(Manifest, SimilarityIndex)> {
        loop {
            let before = self.store.read_manifest()?;
            match self.store.load() {
                Err(EngineError::InconsistentIndex { reason }) if self.store.read_manifest()? != before => {
                    tracing::warn!(%reason, "index replaced during load, retrying");
                }
                other => return other,
            }
        }
    }
}
