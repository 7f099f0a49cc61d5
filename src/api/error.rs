// ============================================================================
// Erreurs de la couche réseau
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - #[error("...")] définit le message affiché
// - Les appelants peuvent matcher sur les variants (contrairement à anyhow)
// ============================================================================

use thiserror::Error;

/// Erreurs possibles lors d'un appel à l'API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// HTTP 429 sur la dernière tentative autorisée
    #[error("rate limited by upstream API after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Statut non-2xx (autre que 429)
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Erreur réseau : DNS, connexion, timeout, lecture du corps
    #[error("transport failure: {0}")]
    Transport(String),

    /// Réponse 2xx dont le corps n'est pas du JSON valide
    #[error("invalid JSON body: {0}")]
    InvalidBody(String),

    /// JSON valide mais sans le champ de prix attendu
    #[error("missing field in API response: {0}")]
    MissingField(String),
}

impl FetchError {
    /// Indique si une nouvelle tentative a du sens
    ///
    /// - 429, tout statut non-2xx, transport, corps illisible : réessayés
    /// - champ manquant : définitif (le corps était valide)
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::MissingField(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(FetchError::RateLimited { attempts: 1 }.is_retryable());
        assert!(FetchError::Http { status: 503 }.is_retryable());
        assert!(FetchError::Http { status: 404 }.is_retryable());
        assert!(FetchError::InvalidBody("eof".into()).is_retryable());
        assert!(FetchError::Transport("reset".into()).is_retryable());
        assert!(!FetchError::MissingField("prices".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::Http { status: 404 }.to_string(), "HTTP error: 404");
    }
}
