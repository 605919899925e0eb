//! Configuration for the sync adapter.

/// Configuration for an adapter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Whether transports may serve responses from a cache.
    pub cache: bool,
    /// Prefix joined in front of relative entity URLs.
    pub base_api_url: String,
}

impl AdapterConfig {
    /// Creates a configuration with caching disabled and no URL prefix.
    pub fn new() -> Self {
        Self {
            cache: false,
            base_api_url: String::new(),
        }
    }

    /// Sets whether responses may be cached.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_api_url(mut self, url: impl Into<String>) -> Self {
        self.base_api_url = url.into();
        self
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_disabled_by_default() {
        let config = AdapterConfig::default();
        assert!(!config.cache);
        assert!(config.base_api_url.is_empty());
    }

    #[test]
    fn adapter_config_builder() {
        let config = AdapterConfig::new()
            .with_cache(true)
            .with_base_api_url("https://api.example.com");

        assert!(config.cache);
        assert_eq!(config.base_api_url, "https://api.example.com");
    }
}
