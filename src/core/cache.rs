//! Model caching utilities for sharing weights across multiple pipelines.
//!
//! This module provides a thread-safe cache for model instances, allowing
//! multiple pipelines to share the same underlying model weights while
//! maintaining independent inference contexts. Weights are loaded once at
//! startup, held read-only for the process lifetime, and released when the
//! process exits.

use crate::core::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Trait implemented by model option types to generate a stable cache key.
pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

/// A thread-safe cache for model instances.
///
/// The cache stores models by a string key (typically the model repo plus
/// device location) and ensures that multiple requests for the same model
/// return clones that share the underlying weights.
pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    /// Create a new empty model cache.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create a model from the cache.
    ///
    /// If a model with the given key already exists, a clone is returned.
    /// Otherwise, the loader function is called to create a new model
    /// instance.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<M>
    where
        M: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let type_id = TypeId::of::<M>();
        let cache_key = (type_id, key.to_string());

        {
            let cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(cached) = cache.get(&cache_key) {
                if let Some(model) = cached.downcast_ref::<M>() {
                    return Ok(model.clone());
                }
            }
        }

        // Loading happens outside the lock so a slow weight download does not
        // block unrelated cache lookups.
        let model = loader()?;

        {
            let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
            cache.insert(
                cache_key,
                Arc::new(model.clone()) as Arc<dyn Any + Send + Sync>,
            );
        }

        Ok(model)
    }

    /// Clear all cached models.
    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.clear();
    }

    /// Get the number of cached models.
    pub fn len(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Global model cache instance.
///
/// This provides a convenient way to share models across the entire
/// application without having to pass the cache around.
static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// Get a reference to the global model cache.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestModel {
        id: String,
    }

    #[test]
    fn cache_returns_same_instance() {
        let cache = ModelCache::new();

        let model1 = cache
            .get_or_create::<TestModel, _>("test-model", || {
                Ok(TestModel {
                    id: "original".to_string(),
                })
            })
            .unwrap();

        let model2 = cache
            .get_or_create::<TestModel, _>("test-model", || {
                // This should not be called
                Ok(TestModel {
                    id: "new".to_string(),
                })
            })
            .unwrap();

        assert_eq!(model1.id, model2.id);
        assert_eq!(model1.id, "original");
    }

    #[test]
    fn loader_errors_are_not_cached() {
        let cache = ModelCache::new();

        let first = cache.get_or_create::<TestModel, _>("flaky", || {
            Err(crate::core::error::PipelineError::ModelUnavailable(
                "boom".into(),
            ))
        });
        assert!(first.is_err());
        assert!(cache.is_empty());

        let second = cache
            .get_or_create::<TestModel, _>("flaky", || {
                Ok(TestModel {
                    id: "recovered".to_string(),
                })
            })
            .unwrap();
        assert_eq!(second.id, "recovered");
        assert_eq!(cache.len(), 1);
    }
}
