use crate::domain::{moderation::ModerationGateway, repository::Store};

pub mod catalog;
pub mod category;
pub mod dashboard;
pub mod engine;
pub mod moderation;
pub mod repository;
pub mod resource;
pub mod tag;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type S: Store;

    fn gateway(&self) -> &ModerationGateway<Self::S>;

    /// Bearer token that identifies moderators
    fn moderator_token(&self) -> &str;
}
