// src/middleware/session.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::user::{Permission, User},
};

pub const USER_HEADER: &str = "x-user-id";

/// Usuário da sessão, resolvido pelo cabeçalho `x-user-id` contra os usuários do store.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .ok_or(AppError::Unauthenticated)?;

        let user = app_state
            .console
            .find_user(id)
            .await
            .filter(|user| user.active)
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// 403 quando o papel do usuário não cobre a permissão.
pub fn require(user: &User, permission: Permission) -> Result<(), AppError> {
    if user.can(permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden(permission))
    }
}
