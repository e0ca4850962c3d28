// src/handlers/clients.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{require, CurrentUser},
    models::{
        client::{Client, ClientView, NewClient},
        user::Permission,
    },
};

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Clientes com receita e projetos ativos recalculados", body = [ClientView])
    ),
    security(("x_user_id" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageClients)?;
    let views = app_state.console.read(|store| store.client_views()).await;
    Ok(Json(views))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = ClientView),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageClients)?;
    let view = app_state
        .console
        .read(|store| store.client_view(id))
        .await
        .ok_or_else(|| AppError::not_found("Cliente", id))?;
    Ok(Json(view))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewClient>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageClients)?;
    let client = app_state.console.create_client(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageClients)?;
    app_state.console.delete::<Client>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
