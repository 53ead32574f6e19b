use crate::{
    core::config::PhotoSearchConfig,
    photos::{PhotoMarker, PhotoProvider, PhotoQuery, ProviderPhoto},
    prelude::HashSet,
    Result,
};
use futures::future::join_all;

/// Keeps the first photo per owner, then the first `cap` of those
pub fn dedupe_by_owner(photos: Vec<ProviderPhoto>, cap: usize) -> Vec<ProviderPhoto> {
    let mut owners = HashSet::default();
    photos
        .into_iter()
        .filter(|photo| owners.insert(photo.owner.clone()))
        .take(cap)
        .collect()
}

/// Fans one query out to every provider and merges their answers.
///
/// Each provider contributes at most `per_provider_cap` photos, one per owner,
/// in provider registration order. A provider that fails is logged and skipped.
pub struct PhotoAggregator {
    providers: Vec<Box<dyn PhotoProvider>>,
    per_provider_cap: usize,
}

impl PhotoAggregator {
    pub fn new(config: &PhotoSearchConfig) -> Self {
        Self {
            providers: Vec::new(),
            per_provider_cap: config.per_provider_cap,
        }
    }

    pub fn with_provider(mut self, provider: impl PhotoProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn images(&self, query: &PhotoQuery) -> Result<Vec<PhotoMarker>> {
        query.validate()?;

        let searches = self.providers.iter().map(|provider| {
            let clamped = query.clamped(provider.max_radius_km());
            async move { (provider.name(), provider.search(&clamped).await) }
        });

        let mut markers = Vec::new();
        for (name, result) in join_all(searches).await {
            match result {
                Ok(photos) => {
                    let kept = dedupe_by_owner(photos, self.per_provider_cap);
                    log::debug!("photo provider '{}' contributed {} photos", name, kept.len());
                    markers.extend(kept.into_iter().map(PhotoMarker::from));
                }
                Err(e) => log::warn!("photo provider '{}' failed: {}", name, e),
            }
        }
        Ok(markers)
    }
}
