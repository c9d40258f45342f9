use crate::{config::Config, services::ConversationService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversationService>,
    pub config: Arc<Config>,
}
