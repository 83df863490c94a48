use std::sync::Arc;

use voyager::agent::Agent;

/// Shared application state. The agent is built once at startup; `None`
/// means initialization failed and every query gets a 500 until the server
/// is restarted with working configuration.
#[derive(Clone, Default)]
pub struct AppState {
    pub agent: Option<Arc<Agent>>,
}

impl AppState {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent: Some(Arc::new(agent)),
        }
    }

    pub fn uninitialized() -> Self {
        Self { agent: None }
    }
}
