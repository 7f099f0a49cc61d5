// ============================================================================
// Transport HTTP
// ============================================================================
// Abstraction minimale d'un GET HTTP : statut + corps texte.
//
// CONCEPT RUST : Trait comme point d'injection
// - Le fetcher avec retry ne connaît que le trait HttpTransport
// - En production : ReqwestTransport (reqwest::Client)
// - En test : un transport scripté qui renvoie des réponses prédéfinies
//
// CONCEPT RUST : #[async_trait]
// - Les méthodes async dans un trait utilisé via `dyn` nécessitent async-trait
// - La macro transforme `async fn` en fonction retournant Pin<Box<dyn Future>>
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::api::FetchError;

/// Réponse HTTP brute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Statut 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Un GET HTTP asynchrone
///
/// Une erreur retournée ici est une erreur de transport (DNS, connexion,
/// timeout, lecture du corps) : un statut HTTP d'erreur n'est PAS une Err.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Transport de production basé sur reqwest
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Crée le client HTTP avec un User-Agent et un timeout par requête
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lazyprice/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("client HTTP invalide : {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!(url = %url, "Sending HTTP request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "Received HTTP response");
        Ok(HttpResponse { status, body })
    }
}
