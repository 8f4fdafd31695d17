use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    ApiClient, ApiConfig, HttpPersonaRepository, Persona, PersonaCache, PersonaError, PersonaFeed,
    PersonaId, PersonaRepository, PersonaResult,
};

/// Where a search result list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    /// Blank query: the whole cached list
    Cache,
    Remote,
    /// Remote search failed; the cached list was filtered locally instead
    LocalFallback,
}

/// Outcome of [`PersonaService::search_with_fallback`]
#[derive(Debug)]
pub struct SearchResults {
    pub personas: Vec<Persona>,
    pub source: SearchSource,
    /// The remote failure behind a [`SearchSource::LocalFallback`], for display
    pub error: Option<PersonaError>,
}

/// Data access for Persona records.
///
/// Owns the session [`PersonaCache`] and is its only writer: the cache changes only after the
/// server acknowledged the corresponding call, and a failed call leaves it exactly as it was.
pub struct PersonaService {
    repository: Arc<dyn PersonaRepository>,
    cache: PersonaCache,
    /// Serializes the first fetch so concurrent `list` calls hit the server once
    load: Mutex<()>,
}

impl PersonaService {
    pub fn new(repository: Arc<dyn PersonaRepository>) -> Self {
        Self {
            repository,
            cache: PersonaCache::new(),
            load: Mutex::new(()),
        }
    }

    /// Service talking to the REST API described by `config`.
    pub fn from_config(config: Arc<ApiConfig>) -> PersonaResult<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self::new(Arc::new(HttpPersonaRepository::new(client))))
    }

    pub fn cache(&self) -> &PersonaCache {
        &self.cache
    }

    pub fn subscribe(&self) -> PersonaFeed {
        self.cache.subscribe()
    }

    /// Feed of the cached list, fetching it first if this session has not yet done so.
    pub async fn list(&self) -> PersonaResult<PersonaFeed> {
        if !self.cache.is_loaded() {
            let _guard = self.load.lock().await;
            if !self.cache.is_loaded() {
                self.fetch_all().await?;
            }
        }
        Ok(self.cache.subscribe())
    }

    /// Refetch the list unconditionally. On failure the cache keeps its contents.
    pub async fn reload(&self) -> PersonaResult<Vec<Persona>> {
        let _guard = self.load.lock().await;
        self.fetch_all().await?;
        Ok(self.cache.snapshot())
    }

    async fn fetch_all(&self) -> PersonaResult<()> {
        match self.repository.list_all().await {
            Ok(personas) => {
                self.cache.replace_all(personas);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to load personas");
                Err(err)
            }
        }
    }

    /// Fetch one record straight from the server; the cache is not involved.
    pub async fn get_by_id(&self, id: PersonaId) -> PersonaResult<Persona> {
        self.repository.find_by_id(id).await
    }

    pub async fn create(&self, persona: &Persona) -> PersonaResult<Persona> {
        let created = self.repository.create(persona).await?;
        info!(id = ?created.id, "persona created");
        self.cache.insert(created.clone());
        Ok(created)
    }

    pub async fn update(&self, id: PersonaId, persona: &Persona) -> PersonaResult<Persona> {
        let mut updated = self.repository.update(id, persona).await?;
        updated.id.get_or_insert(id);
        info!(id, "persona updated");

        if !self.cache.replace(id, updated.clone()) {
            debug!(id, "updated persona not in cache");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: PersonaId) -> PersonaResult<()> {
        self.repository.delete(id).await?;
        info!(id, "persona deleted");
        self.cache.remove(id);
        Ok(())
    }

    /// Server-side search; the cache is not involved.
    pub async fn search(&self, query: &str) -> PersonaResult<Vec<Persona>> {
        self.repository.search(query).await
    }

    pub fn filter_cached(&self, query: &str) -> Vec<Persona> {
        self.cache.filter(query)
    }

    /// Search the way the list view does: a blank query shows everything cached, and a failed
    /// remote search degrades to filtering the cached list.
    pub async fn search_with_fallback(&self, query: &str) -> SearchResults {
        if query.trim().is_empty() {
            return SearchResults {
                personas: self.cache.snapshot(),
                source: SearchSource::Cache,
                error: None,
            };
        }

        match self.search(query.trim()).await {
            Ok(personas) => SearchResults {
                personas,
                source: SearchSource::Remote,
                error: None,
            },
            Err(err) => {
                warn!(error = %err, "remote search failed, filtering cached personas");
                SearchResults {
                    personas: self.filter_cached(query),
                    source: SearchSource::LocalFallback,
                    error: Some(err),
                }
            }
        }
    }

    /// Forget everything cached; the next `list` fetches again.
    pub fn clear(&self) {
        self.cache.clear();
    }
}
