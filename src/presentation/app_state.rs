// Application state for HTTP handlers
use crate::application::diagnostic_service::DiagnosticService;

#[derive(Clone)]
pub struct AppState {
    pub diagnostic_service: DiagnosticService,
}
