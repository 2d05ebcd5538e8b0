pub mod analysis;
pub mod geo_service;
pub mod narrative_service;
pub mod solar_service;

use thiserror::Error;

/// Failure talking to an external collaborator. The orchestration layer maps
/// these into `DesignError::ExternalDataUnavailable`; retry policy, if any,
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("richiesta HTTP fallita: {0}")]
    Http(#[from] reqwest::Error),

    #[error("nessun risultato per: {query}")]
    NotFound { query: String },

    #[error("risposta malformata da {service}: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}
