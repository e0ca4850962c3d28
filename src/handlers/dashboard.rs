// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        i18n::Locale,
        session::{require, CurrentUser},
    },
    models::{
        dashboard::{CampaignTotals, DashboardSummary, LeaderboardEntry, MonthlyPoint, PipelineColumn},
        finance::{RecurringService, Transaction},
        marketing::{Campaign, CampaignState},
        prospect::Prospect,
        user::{Permission, User},
    },
    services::metrics,
};

const MAX_MONTHS: u32 = 24;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeriesQuery {
    /// Quantidade de meses, terminando no atual (padrão 6)
    pub months: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CampaignTotalsQuery {
    /// Filtra por estado; sem filtro soma todas
    pub state: Option<CampaignState>,
}

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do topo: funil, receita do mês e MRR", body = DashboardSummary),
        (status = 401, description = "Sessão ausente"),
        (status = 403, description = "Sem permissão")
    ),
    security(("x_user_id" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ViewDashboard)?;
    let summary = app_state
        .console
        .read(|store| {
            metrics::dashboard_summary(
                store.all::<Prospect>(),
                store.all::<Transaction>(),
                store.all::<RecurringService>(),
                store.now(),
            )
        })
        .await;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/monthly?months=6
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly",
    tag = "Dashboard",
    params(
        SeriesQuery,
        ("accept-language" = Option<String>, Header, description = "Idioma dos rótulos de mês (es, en)")
    ),
    responses(
        (status = 200, description = "Receitas x despesas por mês, do mais antigo ao atual", body = [MonthlyPoint])
    ),
    security(("x_user_id" = []))
)]
pub async fn get_monthly_series(
    State(app_state): State<AppState>,
    Locale(locale): Locale,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SeriesQuery>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ViewDashboard)?;
    let months = query.months.unwrap_or(6).clamp(1, MAX_MONTHS);
    let series = app_state
        .console
        .read(|store| metrics::monthly_series(store.all::<Transaction>(), months, store.now(), locale))
        .await;
    Ok((StatusCode::OK, Json(series)))
}

// GET /api/dashboard/leaderboard
#[utoipa::path(
    get,
    path = "/api/dashboard/leaderboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Ranking de vendas fechadas com meta e comissão", body = [LeaderboardEntry])
    ),
    security(("x_user_id" = []))
)]
pub async fn get_leaderboard(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ViewDashboard)?;
    let ranking = app_state
        .console
        .read(|store| metrics::sales_leaderboard(store.all::<User>(), store.all::<Prospect>()))
        .await;
    Ok((StatusCode::OK, Json(ranking)))
}

// GET /api/dashboard/pipeline
#[utoipa::path(
    get,
    path = "/api/dashboard/pipeline",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais por coluna do quadro", body = [PipelineColumn])
    ),
    security(("x_user_id" = []))
)]
pub async fn get_pipeline_columns(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ViewDashboard)?;
    let columns = app_state
        .console
        .read(|store| metrics::pipeline_columns(store.all::<Prospect>()))
        .await;
    Ok((StatusCode::OK, Json(columns)))
}

// GET /api/dashboard/campaigns?state=activa
#[utoipa::path(
    get,
    path = "/api/dashboard/campaigns",
    tag = "Dashboard",
    params(CampaignTotalsQuery),
    responses(
        (status = 200, description = "Orçamento, gasto, leads e conversões somados", body = CampaignTotals)
    ),
    security(("x_user_id" = []))
)]
pub async fn get_campaign_totals(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CampaignTotalsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // marketing acompanha as próprias campanhas sem ter o dashboard
    if !user.can(Permission::ManageMarketing) {
        require(&user, Permission::ViewDashboard)?;
    }
    let totals = app_state
        .console
        .read(|store| {
            metrics::campaign_totals(
                store
                    .all::<Campaign>()
                    .iter()
                    .filter(|c| query.state.map_or(true, |state| c.state == state)),
            )
        })
        .await;
    Ok((StatusCode::OK, Json(totals)))
}
