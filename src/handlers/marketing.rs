// src/handlers/marketing.rs

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
        marketing::{
            Campaign, CampaignState, Content, Lead, LeadState, NewCampaign, NewContent, NewLead,
            NewPackage, Package,
        },
        user::Permission,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatePayload {
    #[schema(example = "activa")]
    pub state: CampaignState,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatePayload {
    #[schema(example = "calificado")]
    pub state: LeadState,
}

// =========================================================================
//  CAMPANHAS
// =========================================================================

// GET /api/marketing/campaigns
#[utoipa::path(
    get,
    path = "/api/marketing/campaigns",
    tag = "Marketing",
    responses((status = 200, description = "Campanhas", body = [Campaign])),
    security(("x_user_id" = []))
)]
pub async fn list_campaigns(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    Ok(Json(app_state.console.list::<Campaign>().await))
}

// POST /api/marketing/campaigns
#[utoipa::path(
    post,
    path = "/api/marketing/campaigns",
    tag = "Marketing",
    request_body = NewCampaign,
    responses(
        (status = 201, description = "Campanha criada", body = Campaign),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_campaign(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewCampaign>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    let campaign = app_state.console.create_campaign(payload).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

// PATCH /api/marketing/campaigns/{id}/state
#[utoipa::path(
    patch,
    path = "/api/marketing/campaigns/{id}/state",
    tag = "Marketing",
    params(("id" = Uuid, Path, description = "ID da campanha")),
    request_body = CampaignStatePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = Campaign),
        (status = 404, description = "Não encontrada")
    ),
    security(("x_user_id" = []))
)]
pub async fn set_campaign_state(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CampaignStatePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    Ok(Json(app_state.console.set_campaign_state(id, payload.state).await?))
}

// =========================================================================
//  LEADS
// =========================================================================

// GET /api/marketing/leads
#[utoipa::path(
    get,
    path = "/api/marketing/leads",
    tag = "Marketing",
    responses((status = 200, description = "Leads", body = [Lead])),
    security(("x_user_id" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    Ok(Json(app_state.console.list::<Lead>().await))
}

// POST /api/marketing/leads
#[utoipa::path(
    post,
    path = "/api/marketing/leads",
    tag = "Marketing",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead capturado (estado nuevo)", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewLead>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    let lead = app_state.console.create_lead(payload).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// PATCH /api/marketing/leads/{id}/state
#[utoipa::path(
    patch,
    path = "/api/marketing/leads/{id}/state",
    tag = "Marketing",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = LeadStatePayload,
    responses(
        (status = 200, description = "Estado atualizado", body = Lead),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn set_lead_state(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadStatePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    Ok(Json(app_state.console.set_lead_state(id, payload.state).await?))
}

// =========================================================================
//  PACOTES E CONTEÚDOS
// =========================================================================

// GET /api/marketing/packages
#[utoipa::path(
    get,
    path = "/api/marketing/packages",
    tag = "Marketing",
    responses((status = 200, description = "Pacotes de serviços", body = [Package])),
    security(("x_user_id" = []))
)]
pub async fn list_packages(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    Ok(Json(app_state.console.list::<Package>().await))
}

// POST /api/marketing/packages
#[utoipa::path(
    post,
    path = "/api/marketing/packages",
    tag = "Marketing",
    request_body = NewPackage,
    responses(
        (status = 201, description = "Pacote criado", body = Package),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_package(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewPackage>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    let package = app_state.console.create_package(payload).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

// GET /api/marketing/contents
#[utoipa::path(
    get,
    path = "/api/marketing/contents",
    tag = "Marketing",
    responses((status = 200, description = "Calendário de conteúdo", body = [Content])),
    security(("x_user_id" = []))
)]
pub async fn list_contents(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    let mut contents = app_state.console.list::<Content>().await;
    contents.sort_by_key(|c| c.scheduled_for);
    Ok(Json(contents))
}

// POST /api/marketing/contents
#[utoipa::path(
    post,
    path = "/api/marketing/contents",
    tag = "Marketing",
    request_body = NewContent,
    responses(
        (status = 201, description = "Publicação agendada", body = Content),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_content(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewContent>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageMarketing)?;
    let content = app_state.console.create_content(payload).await?;
    Ok((StatusCode::CREATED, Json(content)))
}
