//! RegimeLab Runner: market context resolution around the indicator engine.
//!
//! The [`ContextFetcher`] asks the analysis backend first, falls back to
//! ephemeral server-side analysis of freshly fetched candles, and finally to
//! the local indicator engine. Collaborators sit behind traits
//! ([`AnalysisBackend`], [`CandleProvider`]) so the chain runs against stubs
//! in tests.

pub mod backend;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod provider;
pub mod schema;

pub use backend::{AnalysisBackend, HttpBackend};
pub use cache::{AnalysisCache, CacheKey};
pub use circuit_breaker::CircuitBreaker;
pub use config::{ConfigError, FetcherConfig};
pub use context::{ContextFetcher, ContextSource, MarketContext, RegimeView};
pub use error::FetchError;
pub use provider::{BinanceProvider, CandleProvider};
pub use schema::{AnalysisResponse, BackendAnalysis, EphemeralResponse, SchemaError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the fetcher can be shared across rayon workers.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ContextFetcher>();
        require_sync::<ContextFetcher>();
        require_send::<MarketContext>();
        require_sync::<AnalysisCache<MarketContext>>();
        require_send::<FetchError>();
        require_sync::<CircuitBreaker>();
    }
}
