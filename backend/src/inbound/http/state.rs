//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UsuarioCrud;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub usuarios: Arc<dyn UsuarioCrud>,
}

impl HttpState {
    /// Bundle the CRUD port for handlers.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use usuario_api::domain::{Usuario, UsuarioCrudService};
    /// use usuario_api::inbound::http::HttpState;
    /// use usuario_api::outbound::memory::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::<Usuario>::new());
    /// let state = HttpState::new(Arc::new(UsuarioCrudService::new(store)));
    /// # let _ = state;
    /// ```
    #[must_use]
    pub fn new(usuarios: Arc<dyn UsuarioCrud>) -> Self {
        Self { usuarios }
    }
}
