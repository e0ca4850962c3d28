// src/handlers/quotes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::prospects::visible_prospect,
    middleware::session::{require, CurrentUser},
    models::{
        prospect::Prospect,
        quote::{NewQuote, Quote, QuoteState},
        user::{Permission, User},
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteStatePayload {
    #[schema(example = "enviada")]
    pub state: QuoteState,
}

/// Cotização com a validade calculada na leitura.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    /// Ausente quando a validade cai fora do calendário.
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

impl QuoteResponse {
    fn new(quote: Quote, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: quote.expires_at(),
            expired: quote.is_expired(now),
            quote,
        }
    }
}

// Vendedor só mexe em cotizações dos próprios prospectos.
async fn visible_quote(app_state: &AppState, user: &User, id: Uuid) -> Result<Quote, AppError> {
    let quote = app_state
        .console
        .get::<Quote>(id)
        .await
        .ok_or_else(|| AppError::not_found("Cotização", id))?;
    if !user.can(Permission::ViewAllProspects) {
        let owner = app_state
            .console
            .get::<Prospect>(quote.prospect_id)
            .await
            .map(|p| p.salesperson_id);
        if !owner.is_some_and(|owner| user.sees_salesperson(owner)) {
            return Err(AppError::Forbidden(Permission::ViewAllProspects));
        }
    }
    Ok(quote)
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    responses((status = 200, description = "Cotizações", body = [QuoteResponse])),
    security(("x_user_id" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageQuotes)?;
    let see_all = user.can(Permission::ViewAllProspects);
    let quotes = app_state
        .console
        .read(|store| {
            let now = store.now();
            store
                .visible_quotes(user.id, see_all)
                .into_iter()
                .map(|q| QuoteResponse::new(q, now))
                .collect::<Vec<_>>()
        })
        .await;
    Ok(Json(quotes))
}

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = NewQuote,
    responses(
        (status = 201, description = "Cotização criada com número sequencial e totais", body = Quote),
        (status = 400, description = "Dados inválidos ou valores acima do limite"),
        (status = 403, description = "Prospecto de outro vendedor"),
        (status = 404, description = "Prospecto não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewQuote>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageQuotes)?;
    visible_prospect(&app_state, &user, payload.prospect_id).await?;
    let quote = app_state.console.create_quote(payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

// PATCH /api/quotes/{id}/state
#[utoipa::path(
    patch,
    path = "/api/quotes/{id}/state",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID da cotização")),
    request_body = QuoteStatePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = Quote),
        (status = 403, description = "Cotização de outro vendedor"),
        (status = 404, description = "Não encontrada")
    ),
    security(("x_user_id" = []))
)]
pub async fn set_quote_state(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteStatePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageQuotes)?;
    visible_quote(&app_state, &user, id).await?;
    let quote = app_state.console.set_quote_state(id, payload.state).await?;
    Ok(Json(quote))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID da cotização")),
    responses(
        (status = 204, description = "Removida"),
        (status = 403, description = "Cotização de outro vendedor"),
        (status = 404, description = "Não encontrada")
    ),
    security(("x_user_id" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageQuotes)?;
    visible_quote(&app_state, &user, id).await?;
    app_state.console.delete::<Quote>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
