use runlens_application::ScenarioSearchService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub search_service: ScenarioSearchService,
}
