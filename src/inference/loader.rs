//! Lazy, process-wide classifier loading.
//!
//! Loading the classifier is expensive (artifact read plus session
//! construction), so it happens once per [`ModelLoader`] and the handle is
//! cached for the loader's lifetime. The load is single-flight: the first
//! caller performs it on the blocking pool while concurrent callers await
//! the same in-flight result. A failed load leaves the cache empty, so a
//! later invocation retries instead of being stuck behind a cached error.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{Classifier, OrtClassifier};
use crate::core::AnalysisError;
use crate::core::constants::DEFAULT_MODEL_PATH;

/// Builds a classifier from its serialized artifact.
///
/// The pipeline is constructed against this seam rather than a concrete
/// runtime so tests can substitute stub classifiers.
pub trait ClassifierFactory: Send + Sync {
    /// Fetches and deserializes the classifier.
    ///
    /// Called at most once per successful load; called again only after a
    /// previous attempt failed.
    fn load(&self) -> Result<Arc<dyn Classifier>, AnalysisError>;
}

/// Loads an [`OrtClassifier`] from a model artifact on disk.
#[derive(Debug, Clone)]
pub struct OrtClassifierFactory {
    model_path: PathBuf,
}

impl OrtClassifierFactory {
    /// Creates a factory for the artifact at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }

    /// Creates a factory for the well-known default artifact location.
    pub fn at_default_path() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ClassifierFactory for OrtClassifierFactory {
    fn load(&self) -> Result<Arc<dyn Classifier>, AnalysisError> {
        let classifier = OrtClassifier::load(&self.model_path)?;
        info!(model = %classifier.model_name(), "classifier loaded");
        Ok(Arc::new(classifier))
    }
}

/// Memoized, single-flight access to the process-wide classifier handle.
///
/// The handle is read-only after construction and safely shared across
/// concurrent analyses. There is no teardown; the model lives as long as
/// the loader does.
pub struct ModelLoader {
    factory: Arc<dyn ClassifierFactory>,
    model: OnceCell<Arc<dyn Classifier>>,
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl ModelLoader {
    /// Creates a loader that builds its classifier through `factory`.
    pub fn new(factory: impl ClassifierFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            model: OnceCell::new(),
        }
    }

    /// Whether a classifier handle is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Returns the cached classifier, loading it on first use.
    ///
    /// Safe to call concurrently: at most one load runs at a time and every
    /// waiter observes its outcome. The load itself runs on the blocking
    /// pool so the awaiting task is never blocked.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelUnavailable`] if the load fails. The
    /// cache stays empty, so the next call retries.
    pub async fn ensure_model(&self) -> Result<Arc<dyn Classifier>, AnalysisError> {
        self.model
            .get_or_try_init(|| {
                let factory = Arc::clone(&self.factory);
                async move {
                    debug!("loading classifier");
                    tokio::task::spawn_blocking(move || factory.load())
                        .await
                        .map_err(|e| AnalysisError::model_unavailable("model load task failed", e))?
                }
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::RawScore;
    use ndarray::ArrayView4;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClassifier;

    impl Classifier for StubClassifier {
        fn run(&self, _input: ArrayView4<'_, f32>) -> Result<RawScore, AnalysisError> {
            Ok(0.5)
        }
    }

    /// Counts load attempts and fails the first `fail_first` of them.
    struct CountingFactory {
        loads: Arc<AtomicUsize>,
        fail_first: usize,
    }

    impl ClassifierFactory for CountingFactory {
        fn load(&self) -> Result<Arc<dyn Classifier>, AnalysisError> {
            let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
            if attempt < self.fail_first {
                Err(AnalysisError::model_unavailable_msg("artifact fetch failed"))
            } else {
                Ok(Arc::new(StubClassifier))
            }
        }
    }

    #[tokio::test]
    async fn test_ensure_model_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = ModelLoader::new(CountingFactory {
            loads: Arc::clone(&loads),
            fail_first: 0,
        });

        loader.ensure_model().await.unwrap();
        loader.ensure_model().await.unwrap();
        loader.ensure_model().await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(loader.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = ModelLoader::new(CountingFactory {
            loads: Arc::clone(&loads),
            fail_first: 1,
        });

        let err = match loader.ensure_model().await {
            Ok(_) => panic!("expected model load to fail"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), crate::core::ErrorKind::ModelUnavailable);
        assert!(!loader.is_loaded());

        loader.ensure_model().await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(loader.is_loaded());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(ModelLoader::new(CountingFactory {
            loads: Arc::clone(&loads),
            fail_first: 0,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.ensure_model().await.map(|_| ()) })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
