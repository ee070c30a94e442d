use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::{AppState, moderation::Caller};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the caller from the `Authorization` header. The configured
/// moderator token grants the moderator role, anything else is anonymous.
impl<S: AppState> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim);

        match token {
            Some(token) if token == state.moderator_token() => Ok(Caller::moderator()),
            _ => Ok(Caller::anonymous()),
        }
    }
}
