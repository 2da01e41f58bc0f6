// Application state for HTTP handlers
use crate::application::view_controller::DashboardViewController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardViewController>,
}
