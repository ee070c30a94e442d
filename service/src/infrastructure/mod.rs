use std::sync::Arc;

use crate::domain::{AppState, moderation::ModerationGateway};
use crate::infrastructure::persistence::PostgresStore;

pub mod http;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl {
    gateway: ModerationGateway<PostgresStore>,
    moderator_token: Arc<str>,
}

impl AppStateImpl {
    pub fn new(gateway: ModerationGateway<PostgresStore>, moderator_token: &str) -> Self {
        Self {
            gateway,
            moderator_token: Arc::from(moderator_token),
        }
    }
}

impl AppState for AppStateImpl {
    type S = PostgresStore;

    fn gateway(&self) -> &ModerationGateway<Self::S> {
        &self.gateway
    }

    fn moderator_token(&self) -> &str {
        &self.moderator_token
    }
}
