use std::sync::Arc;

use crate::backend_client::AdvisorBackend;
use crate::quiz::WizardRegistry;
use crate::session::SessionStore;
use crate::submission::SubmissionCoordinator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Recommendation backend. `HttpBackend` in production, stubs in tests.
    pub backend: Arc<dyn AdvisorBackend>,
    pub store: SessionStore,
    pub wizards: WizardRegistry,
    pub submissions: SubmissionCoordinator,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn AdvisorBackend>,
        store: SessionStore,
        wizards: WizardRegistry,
    ) -> Self {
        let submissions = SubmissionCoordinator::new(Arc::clone(&backend), store.clone());
        Self {
            backend,
            store,
            wizards,
            submissions,
        }
    }
}
