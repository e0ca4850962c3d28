// src/handlers/tickets.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{require, CurrentUser},
    models::{
        support::{NewTicket, NewTicketReply, Ticket, TicketStatus},
        user::Permission,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatusPayload {
    #[schema(example = "resuelto")]
    pub status: TicketStatus,
}

// GET /api/tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Support",
    responses((status = 200, description = "Tickets", body = [Ticket])),
    security(("x_user_id" = []))
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageTickets)?;
    Ok(Json(app_state.console.list::<Ticket>().await))
}

// POST /api/tickets
#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Support",
    request_body = NewTicket,
    responses(
        (status = 201, description = "Ticket aberto", body = Ticket),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewTicket>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageTickets)?;
    let ticket = app_state.console.create_ticket(payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

// POST /api/tickets/{id}/replies
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/replies",
    tag = "Support",
    params(("id" = Uuid, Path, description = "ID do ticket")),
    request_body = NewTicketReply,
    responses(
        (status = 201, description = "Resposta adicionada", body = Ticket),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn reply_ticket(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewTicketReply>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageTickets)?;
    // resposta do cliente não tem autor interno
    let author = (!payload.from_client).then_some(user.id);
    let ticket = app_state.console.reply_ticket(id, payload, author).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

// PATCH /api/tickets/{id}/status
#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    tag = "Support",
    params(("id" = Uuid, Path, description = "ID do ticket")),
    request_body = TicketStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Ticket),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn set_ticket_status(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TicketStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageTickets)?;
    Ok(Json(app_state.console.set_ticket_status(id, payload.status).await?))
}
