//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use khozo_core::config::CacheConfig;
use khozo_core::error::AppError;
use khozo_core::result::AppResult;
use khozo_core::traits::CacheProvider;

use crate::memory::MemoryCacheProvider;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            "memory" => {
                info!(
                    max_capacity = config.max_capacity,
                    "Initializing in-memory cache provider"
                );
                Arc::new(MemoryCacheProvider::new(config.max_capacity))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let config = CacheConfig {
            provider: "redis".into(),
            ..Default::default()
        };
        let err = CacheManager::new(&config).unwrap_err();
        assert_eq!(err.kind, khozo_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_manager_reports_healthy_memory_backend() {
        let manager = CacheManager::new(&CacheConfig::default()).unwrap();
        assert!(manager.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_manager_delegates_json() {
        let manager = CacheManager::new(&CacheConfig::default()).unwrap();
        manager
            .set_json("khozo:test", &vec![1, 2, 3], Duration::from_secs(30))
            .await
            .unwrap();
        let back: Option<Vec<i32>> = manager.get_json("khozo:test").await.unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }
}
