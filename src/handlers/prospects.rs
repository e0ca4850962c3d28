// src/handlers/prospects.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{require, CurrentUser},
    models::{
        client::Client,
        prospect::{FollowUp, NewFollowUp, NewProspect, PipelineStage, Prospect, ProspectPatch},
        user::{Permission, User},
    },
    services::pipeline::{self, BoardColumn, DragSession, StageChange},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveStagePayload {
    /// `null` = soltou fora de uma coluna do quadro
    #[serde(default)]
    #[schema(example = "entregado")]
    pub stage: Option<PipelineStage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageMoveResponse {
    pub change: StageChange,
    pub prospect: Prospect,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub client: Client,
    pub prospect: Prospect,
    /// `false` quando o cliente já existia.
    pub created: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpResponse {
    pub follow_up: FollowUp,
    pub prospect: Prospect,
}

// Vendedor sem ViewAllProspects só enxerga os próprios prospectos.
pub(crate) async fn visible_prospect(app_state: &AppState, user: &User, id: Uuid) -> Result<Prospect, AppError> {
    let prospect = app_state
        .console
        .get::<Prospect>(id)
        .await
        .ok_or_else(|| AppError::not_found("Prospecto", id))?;
    if !user.sees_salesperson(prospect.salesperson_id) {
        return Err(AppError::Forbidden(Permission::ViewAllProspects));
    }
    Ok(prospect)
}

async fn visible_prospects(app_state: &AppState, user: &User) -> Vec<Prospect> {
    let see_all = user.can(Permission::ViewAllProspects);
    let user_id = user.id;
    app_state
        .console
        .read(|store| store.visible_prospects(user_id, see_all))
        .await
}

// GET /api/prospects
#[utoipa::path(
    get,
    path = "/api/prospects",
    tag = "Pipeline",
    responses(
        (status = 200, description = "Prospectos visíveis para o usuário", body = [Prospect]),
        (status = 401, description = "Sessão ausente"),
        (status = 403, description = "Sem permissão")
    ),
    security(("x_user_id" = []))
)]
pub async fn list_prospects(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    Ok(Json(visible_prospects(&app_state, &user).await))
}

// GET /api/prospects/board
#[utoipa::path(
    get,
    path = "/api/prospects/board",
    tag = "Pipeline",
    responses(
        (status = 200, description = "Quadro Kanban: uma coluna por etapa, em ordem", body = [BoardColumn])
    ),
    security(("x_user_id" = []))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    let prospects = visible_prospects(&app_state, &user).await;
    Ok(Json(pipeline::board(&prospects)))
}

// GET /api/prospects/{id}
#[utoipa::path(
    get,
    path = "/api/prospects/{id}",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    responses(
        (status = 200, description = "Prospecto", body = Prospect),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn get_prospect(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    Ok(Json(visible_prospect(&app_state, &user, id).await?))
}

// POST /api/prospects
#[utoipa::path(
    post,
    path = "/api/prospects",
    tag = "Pipeline",
    request_body = NewProspect,
    responses(
        (status = 201, description = "Prospecto criado", body = Prospect),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_prospect(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<NewProspect>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    // quem não vê tudo só cria prospectos para si
    if !user.can(Permission::ViewAllProspects) {
        payload.salesperson_id = user.id;
    }
    let prospect = app_state.console.create_prospect(payload).await?;
    Ok((StatusCode::CREATED, Json(prospect)))
}

// PATCH /api/prospects/{id}
#[utoipa::path(
    patch,
    path = "/api/prospects/{id}",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    request_body = ProspectPatch,
    responses(
        (status = 200, description = "Prospecto atualizado", body = Prospect),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn update_prospect(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProspectPatch>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    visible_prospect(&app_state, &user, id).await?;
    let prospect = app_state.console.update_prospect(id, patch).await?;
    Ok(Json(prospect))
}

// DELETE /api/prospects/{id}
#[utoipa::path(
    delete,
    path = "/api/prospects/{id}",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    responses(
        (status = 204, description = "Removido (cotizações ligadas ficam como estão)"),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn delete_prospect(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    visible_prospect(&app_state, &user, id).await?;
    app_state.console.delete::<Prospect>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/prospects/{id}/stage
#[utoipa::path(
    post,
    path = "/api/prospects/{id}/stage",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    request_body = MoveStagePayload,
    responses(
        (status = 200, description = "Resultado do arrasto (mesma etapa ou fora do quadro = unchanged)", body = StageMoveResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn move_stage(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveStagePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    let current = visible_prospect(&app_state, &user, id).await?;

    let mut drag = DragSession::new();
    drag.start(id);
    let Some((dragged, stage)) = drag.drop_on(payload.stage) else {
        return Ok(Json(StageMoveResponse {
            change: StageChange::Unchanged,
            prospect: current,
        }));
    };

    let (change, prospect) = app_state.console.move_prospect(dragged, stage).await?;
    Ok(Json(StageMoveResponse { change, prospect }))
}

// POST /api/prospects/{id}/follow-ups
#[utoipa::path(
    post,
    path = "/api/prospects/{id}/follow-ups",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    request_body = NewFollowUp,
    responses(
        (status = 201, description = "Seguimento registrado", body = FollowUpResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn add_follow_up(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewFollowUp>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    visible_prospect(&app_state, &user, id).await?;
    let (follow_up, prospect) = app_state.console.add_follow_up(id, payload, user.id).await?;
    Ok((StatusCode::CREATED, Json(FollowUpResponse { follow_up, prospect })))
}

// POST /api/prospects/{id}/convert
#[utoipa::path(
    post,
    path = "/api/prospects/{id}/convert",
    tag = "Pipeline",
    params(("id" = Uuid, Path, description = "ID do prospecto")),
    responses(
        (status = 201, description = "Cliente criado", body = ConversionResponse),
        (status = 200, description = "Já convertido: cliente existente", body = ConversionResponse),
        (status = 409, description = "Já convertido e a política recusa repetir")
    ),
    security(("x_user_id" = []))
)]
pub async fn convert_prospect(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManagePipeline)?;
    visible_prospect(&app_state, &user, id).await?;
    let conversion = app_state.console.convert_prospect(id).await?;
    let status = if conversion.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ConversionResponse {
            client: conversion.client,
            prospect: conversion.prospect,
            created: conversion.created,
        }),
    ))
}
