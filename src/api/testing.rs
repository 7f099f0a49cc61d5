// ============================================================================
// Transport scripté pour les tests
// ============================================================================
// Remplace le réseau : chaque route (sous-chaîne de l'URL) a une file de
// réponses. La dernière réponse d'une file est rejouée indéfiniment.
// ============================================================================

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{FetchError, HttpResponse, HttpTransport};

type Scripted = Result<HttpResponse, FetchError>;

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<Scripted>)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une route : toute URL contenant `pattern` reçoit ces réponses
    pub fn route(self, pattern: &str, responses: Vec<Scripted>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((pattern.to_string(), responses.into()));
        self
    }

    /// Nombre d'appels dont l'URL contient `pattern`
    pub fn count(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }

    /// Toutes les URLs appelées, dans l'ordre
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .iter_mut()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, queue)| queue);

        match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}
