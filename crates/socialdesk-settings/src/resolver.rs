//! Configuration resolver
//!
//! Remote store first, environment second, cached for a fixed TTL.

use crate::{
    cache::SettingsCache,
    record::{EnvSource, ProcessEnv, SettingsRecord, SettingsSnapshot},
    store::{SettingsStore, SupabaseSettingsStore},
    Result, SettingsError,
};
use socialdesk_core::{EndpointConfig, Integration, SettingsStoreConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct SettingsResolver {
    store: Option<Arc<dyn SettingsStore>>,
    env: Arc<dyn EnvSource>,
    cache: Arc<SettingsCache>,
    fetch_timeout: Duration,
    /// Serialises refreshes so concurrent misses issue one remote fetch
    refresh_lock: Mutex<()>,
}

impl SettingsResolver {
    pub fn new(
        store: Option<Arc<dyn SettingsStore>>,
        env: Arc<dyn EnvSource>,
        cache: Arc<SettingsCache>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            env,
            cache,
            fetch_timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Resolver over the process environment and, when a Supabase URL is
    /// configured, the remote store
    pub fn from_config(config: &SettingsStoreConfig) -> Result<Self> {
        let store: Option<Arc<dyn SettingsStore>> = if config.is_remote_enabled() {
            Some(Arc::new(SupabaseSettingsStore::new(config)?))
        } else {
            info!("No settings store configured, using environment variables only");
            None
        };

        Ok(Self::new(
            store,
            Arc::new(ProcessEnv),
            Arc::new(SettingsCache::new(config.cache_ttl())),
            config.fetch_timeout(),
        ))
    }

    /// Resolver that never contacts a remote store
    pub fn env_only(env: Arc<dyn EnvSource>, cache_ttl: Duration) -> Self {
        Self::new(
            None,
            env,
            Arc::new(SettingsCache::new(cache_ttl)),
            Duration::ZERO,
        )
    }

    pub fn cache(&self) -> &Arc<SettingsCache> {
        &self.cache
    }

    /// Current endpoint configuration for one integration.
    ///
    /// Never fails: an integration nobody configured comes back with an
    /// empty URL.
    pub async fn resolve(&self, integration: Integration) -> EndpointConfig {
        self.snapshot().await.endpoint(integration)
    }

    /// Current snapshot, refreshing it on cache miss or expiry
    pub async fn snapshot(&self) -> Arc<SettingsSnapshot> {
        if let Some(snapshot) = self.cache.get(Instant::now()) {
            return snapshot;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(snapshot) = self.cache.get(Instant::now()) {
            return snapshot;
        }

        let snapshot = Arc::new(self.load().await);
        self.cache.set(Arc::clone(&snapshot), Instant::now());

        debug!(
            source = ?snapshot.source(),
            configured = snapshot.configured().len(),
            "Settings snapshot refreshed"
        );

        snapshot
    }

    /// Drop the cached snapshot so the next call refetches
    pub fn invalidate(&self) {
        self.cache.invalidate();
        debug!("Settings cache invalidated");
    }

    /// Write a new record through the store, then invalidate the cache
    pub async fn save(&self, record: &SettingsRecord) -> Result<()> {
        let store = self.store.as_ref().ok_or(SettingsError::StoreNotConfigured)?;
        store.save(record).await?;
        self.invalidate();
        Ok(())
    }

    async fn load(&self) -> SettingsSnapshot {
        match self.fetch_remote().await {
            Ok(record) => SettingsSnapshot::from_record(&record, self.env.as_ref()),
            Err(SettingsError::StoreNotConfigured) => SettingsSnapshot::from_env(self.env.as_ref()),
            Err(e) => {
                warn!(error = %e, "Settings store unavailable, falling back to environment");
                SettingsSnapshot::from_env(self.env.as_ref())
            }
        }
    }

    async fn fetch_remote(&self) -> Result<SettingsRecord> {
        let store = self.store.as_ref().ok_or(SettingsError::StoreNotConfigured)?;

        match tokio::time::timeout(self.fetch_timeout, store.fetch()).await {
            Ok(Ok(Some(record))) => Ok(record),
            Ok(Ok(None)) => Err(SettingsError::RecordNotFound),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SettingsError::Timeout(self.fetch_timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SettingsSource;
    use crate::store::MockSettingsStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_millis(300_000);
    const FETCH_TIMEOUT: Duration = Duration::from_millis(1_500);

    fn env() -> Arc<dyn EnvSource> {
        let mut vars = HashMap::new();
        vars.insert("N8N_ANALYTICS_URL".to_string(), "https://env.example.com/analytics".to_string());
        vars.insert("N8N_AI_AGENT_URL".to_string(), "https://env.example.com/ai".to_string());
        Arc::new(vars)
    }

    fn remote_record() -> SettingsRecord {
        SettingsRecord::default()
            .with_url(Integration::AiAgent, "https://remote.example.com/ai")
            .with_ai_agent_token("remote-token")
    }

    fn resolver(store: impl SettingsStore + 'static) -> SettingsResolver {
        SettingsResolver::new(
            Some(Arc::new(store)),
            env(),
            Arc::new(SettingsCache::new(TTL)),
            FETCH_TIMEOUT,
        )
    }

    /// Store that takes `delay` to answer and counts fetches
    struct SlowStore {
        delay: Duration,
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SettingsStore for SlowStore {
        async fn fetch(&self) -> Result<Option<SettingsRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Some(remote_record()))
        }

        async fn save(&self, _record: &SettingsRecord) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_record_is_used() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(1).returning(|| Ok(Some(remote_record())));
        let resolver = resolver(store);

        let ai = resolver.resolve(Integration::AiAgent).await;
        assert_eq!(ai.url, "https://remote.example.com/ai");
        assert_eq!(ai.bearer_token(), Some("remote-token"));

        // missing from the record, present in env
        let analytics = resolver.resolve(Integration::Analytics).await;
        assert_eq!(analytics.url, "https://env.example.com/analytics");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_bounds_remote_fetches() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(2).returning(|| Ok(Some(remote_record())));
        let resolver = resolver(store);

        resolver.resolve(Integration::AiAgent).await;
        tokio::time::advance(Duration::from_millis(299_000)).await;
        resolver.resolve(Integration::Analytics).await;

        // past the TTL: one more fetch
        tokio::time::advance(Duration::from_millis(1_001)).await;
        resolver.resolve(Integration::AiAgent).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_error_falls_back_to_env() {
        let mut store = MockSettingsStore::new();
        store
            .expect_fetch()
            .times(1)
            .returning(|| Err(SettingsError::Http("connection refused".into())));
        let resolver = resolver(store);

        let snapshot = resolver.snapshot().await;
        assert_eq!(snapshot.source(), SettingsSource::Environment);
        assert_eq!(snapshot.endpoint(Integration::AiAgent).url, "https://env.example.com/ai");
        assert_eq!(snapshot.endpoint(Integration::AiAgent).bearer_token(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_record_falls_back_to_env() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(1).returning(|| Ok(None));
        let resolver = resolver(store);

        let analytics = resolver.resolve(Integration::Analytics).await;
        assert_eq!(analytics.url, "https://env.example.com/analytics");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out_to_env() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let resolver = resolver(SlowStore {
            delay: Duration::from_secs(30),
            fetches: Arc::clone(&fetches),
        });

        let started = Instant::now();
        let snapshot = resolver.snapshot().await;

        assert_eq!(snapshot.source(), SettingsSource::Environment);
        assert!(started.elapsed() >= FETCH_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_fetch_once() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let resolver = Arc::new(resolver(SlowStore {
            delay: Duration::from_millis(100),
            fetches: Arc::clone(&fetches),
        }));

        let calls = (0..10).map(|_| {
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve(Integration::AiAgent).await }
        });
        let endpoints = futures::future::join_all(calls).await;

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(endpoints.iter().all(|e| e.url == "https://remote.example.com/ai"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(2).returning(|| Ok(Some(remote_record())));
        let resolver = resolver(store);

        resolver.resolve(Integration::AiAgent).await;
        resolver.invalidate();
        resolver.resolve(Integration::AiAgent).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_writes_then_invalidates() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(2).returning(|| Ok(Some(remote_record())));
        store.expect_save().times(1).returning(|_| Ok(()));
        let resolver = resolver(store);

        resolver.resolve(Integration::AiAgent).await;
        resolver.save(&remote_record()).await.unwrap();
        resolver.resolve(Integration::AiAgent).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_error_keeps_cache() {
        let mut store = MockSettingsStore::new();
        store.expect_fetch().times(1).returning(|| Ok(Some(remote_record())));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(SettingsError::Remote { status: 403, body: "denied".into() }));
        let resolver = resolver(store);

        resolver.resolve(Integration::AiAgent).await;
        assert!(resolver.save(&remote_record()).await.is_err());
        resolver.resolve(Integration::AiAgent).await;
    }

    #[tokio::test]
    async fn test_env_only_resolver() {
        let resolver = SettingsResolver::env_only(env(), TTL);

        let analytics = resolver.resolve(Integration::Analytics).await;
        assert_eq!(analytics.url, "https://env.example.com/analytics");
        assert!(!resolver.resolve(Integration::Comments).await.has_url());
        assert!(matches!(
            resolver.save(&SettingsRecord::default()).await,
            Err(SettingsError::StoreNotConfigured)
        ));
    }
}
