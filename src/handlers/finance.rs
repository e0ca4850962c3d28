// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{require, CurrentUser},
    models::{
        finance::{
            NewRecurringService, NewServicePayment, NewTransaction, RecurringService,
            RecurringState, Transaction,
        },
        user::Permission,
    },
    services::metrics,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringStatePayload {
    #[schema(example = "pausado")]
    pub state: RecurringState,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenewalsQuery {
    /// Janela em dias a partir de hoje (padrão 30, máximo 3650)
    pub days: Option<i64>,
}

const MAX_RENEWAL_DAYS: i64 = 3650;

// =========================================================================
//  TRANSAÇÕES
// =========================================================================

// GET /api/finance/transactions
#[utoipa::path(
    get,
    path = "/api/finance/transactions",
    tag = "Finance",
    responses((status = 200, description = "Transações", body = [Transaction])),
    security(("x_user_id" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    Ok(Json(app_state.console.list::<Transaction>().await))
}

// POST /api/finance/transactions
#[utoipa::path(
    post,
    path = "/api/finance/transactions",
    tag = "Finance",
    request_body = NewTransaction,
    responses(
        (status = 201, description = "Transação registrada", body = Transaction),
        (status = 400, description = "Valor negativo ou categoria incompatível com o tipo")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewTransaction>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    let transaction = app_state.console.create_transaction(payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

// =========================================================================
//  SERVIÇOS RECORRENTES
// =========================================================================

// GET /api/finance/recurring
#[utoipa::path(
    get,
    path = "/api/finance/recurring",
    tag = "Finance",
    responses((status = 200, description = "Serviços recorrentes", body = [RecurringService])),
    security(("x_user_id" = []))
)]
pub async fn list_recurring(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    Ok(Json(app_state.console.list::<RecurringService>().await))
}

// POST /api/finance/recurring
#[utoipa::path(
    post,
    path = "/api/finance/recurring",
    tag = "Finance",
    request_body = NewRecurringService,
    responses(
        (status = 201, description = "Serviço criado (estado activo)", body = RecurringService),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_recurring(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewRecurringService>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    let service = app_state.console.create_recurring_service(payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

// POST /api/finance/recurring/{id}/payments
#[utoipa::path(
    post,
    path = "/api/finance/recurring/{id}/payments",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = NewServicePayment,
    responses(
        (status = 201, description = "Pagamento anexado ao histórico", body = RecurringService),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewServicePayment>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    let service = app_state.console.record_service_payment(id, payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

// PATCH /api/finance/recurring/{id}/state
#[utoipa::path(
    patch,
    path = "/api/finance/recurring/{id}/state",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = RecurringStatePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = RecurringService),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn set_recurring_state(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecurringStatePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    Ok(Json(app_state.console.set_recurring_state(id, payload.state).await?))
}

// GET /api/finance/renewals?days=30
#[utoipa::path(
    get,
    path = "/api/finance/renewals",
    tag = "Finance",
    params(RenewalsQuery),
    responses((status = 200, description = "Renovações próximas, a mais próxima primeiro", body = [RecurringService])),
    security(("x_user_id" = []))
)]
pub async fn upcoming_renewals(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RenewalsQuery>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageFinance)?;
    let days = query.days.unwrap_or(30).clamp(0, MAX_RENEWAL_DAYS);
    let due = app_state
        .console
        .read(|store| {
            let today = store.now().date_naive();
            metrics::upcoming_renewals(store.all::<RecurringService>(), today, days)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
        .await;
    Ok(Json(due))
}
