// src/handlers/commissions.rs

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
        dashboard::CommissionTotals,
        finance::{Commission, CommissionState, NewCommission},
        user::Permission,
    },
    services::metrics,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionStatePayload {
    #[schema(example = "aprobada")]
    pub state: CommissionState,
}

// GET /api/commissions
#[utoipa::path(
    get,
    path = "/api/commissions",
    tag = "Commissions",
    responses((status = 200, description = "Comissões", body = [Commission])),
    security(("x_user_id" = []))
)]
pub async fn list_commissions(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageCommissions)?;
    Ok(Json(app_state.console.list::<Commission>().await))
}

// GET /api/commissions/totals
#[utoipa::path(
    get,
    path = "/api/commissions/totals",
    tag = "Commissions",
    responses((status = 200, description = "Somatório por estado", body = CommissionTotals)),
    security(("x_user_id" = []))
)]
pub async fn commission_totals(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageCommissions)?;
    let totals = app_state
        .console
        .read(|store| metrics::commission_totals(store.all::<Commission>()))
        .await;
    Ok(Json(totals))
}

// POST /api/commissions
#[utoipa::path(
    post,
    path = "/api/commissions",
    tag = "Commissions",
    request_body = NewCommission,
    responses(
        (status = 201, description = "Comissão criada (pendiente)", body = Commission),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_commission(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewCommission>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageCommissions)?;
    let commission = app_state.console.create_commission(payload).await?;
    Ok((StatusCode::CREATED, Json(commission)))
}

// PATCH /api/commissions/{id}/state
#[utoipa::path(
    patch,
    path = "/api/commissions/{id}/state",
    tag = "Commissions",
    params(("id" = Uuid, Path, description = "ID da comissão")),
    request_body = CommissionStatePayload,
    responses(
        (status = 200, description = "Estado avançado", body = Commission),
        (status = 409, description = "Transição inválida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("x_user_id" = []))
)]
pub async fn advance_commission(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommissionStatePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageCommissions)?;
    Ok(Json(app_state.console.advance_commission(id, payload.state).await?))
}
