use std::sync::Arc;

use crate::config::AppConfig;
use crate::executor::PipelineExecutor;
use crate::orchestrator::{MockOrchestrator, Orchestrator};
use crate::pipelines::PipelineRegistry;
use crate::store::JobStore;

/// Everything a handler needs, injected through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore>,
    pub registry: Arc<PipelineRegistry>,
    pub orchestrator: Arc<dyn Orchestrator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Fresh store, default registry and the in-process mock orchestrator.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(JobStore::new());
        let executor = PipelineExecutor::new(Arc::clone(&store), config.executor);
        AppState {
            orchestrator: Arc::new(MockOrchestrator::new(executor)),
            store,
            registry: Arc::new(PipelineRegistry::default()),
            config: Arc::new(config),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: Arc<dyn Orchestrator>) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_registry(mut self, registry: PipelineRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }
}
