use contextor::AskDefaults;

use crate::core::app_config::AppConfig;

/// Shared state for all HTTP handlers.
///
/// Built once in `main` and shared behind an `Arc`; the clients are
/// type parameters so tests can plug in fakes.
pub struct AppState<K, D, G> {
    /// Knowledge base (retrieval and ingestion jobs).
    pub kb: K,
    /// Document storage for uploads.
    pub docs: D,
    /// Generation backend selected at startup.
    pub llm: G,
    /// Defaults for `/ask` parameters the caller leaves out.
    pub defaults: AskDefaults,
    pub config: AppConfig,
}

impl<K, D, G> AppState<K, D, G> {
    pub fn new(kb: K, docs: D, llm: G, defaults: AskDefaults, config: AppConfig) -> Self {
        Self {
            kb,
            docs,
            llm,
            defaults,
            config,
        }
    }
}
