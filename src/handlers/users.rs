// src/handlers/users.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::CurrentUser,
    models::user::User,
};

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário da sessão", body = User),
        (status = 401, description = "Sessão ausente ou usuário inativo")
    ),
    security(("x_user_id" = []))
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Equipe (usuários de exemplo)", body = [User])),
    security(("x_user_id" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.console.list::<User>().await))
}
