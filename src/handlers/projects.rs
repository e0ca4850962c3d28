// src/handlers/projects.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::{require, CurrentUser},
    models::{
        finance::Commission,
        project::{AccessCredential, NewProject, Project, ProjectPatch},
        user::Permission,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFilePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "brief.pdf")]
    pub name: String,
    #[validate(url(message = "invalid_url"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAccessPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "cPanel")]
    pub platform: String,
    pub url: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub username: String,
    pub password: String,
}

/// Projeto com o percentual do checklist calculado na leitura.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub checklist_completion: u8,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            checklist_completion: project.checklist_completion(),
            project,
        }
    }
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses((status = 200, description = "Projetos", body = [ProjectResponse])),
    security(("x_user_id" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    let projects: Vec<ProjectResponse> = app_state
        .console
        .list::<Project>()
        .await
        .into_iter()
        .map(ProjectResponse::from)
        .collect();
    Ok(Json(projects))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Projeto criado", body = ProjectResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NewProject>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    let project = app_state.console.create_project(payload).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

// PATCH /api/projects/{id}
#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    request_body = ProjectPatch,
    responses(
        (status = 200, description = "Projeto atualizado", body = ProjectResponse),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProjectPatch>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    let project = app_state.console.update_project(id, patch).await?;
    Ok(Json(ProjectResponse::from(project)))
}

// POST /api/projects/{id}/tasks/{task_id}/toggle
#[utoipa::path(
    post,
    path = "/api/projects/{id}/tasks/{task_id}/toggle",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("task_id" = Uuid, Path, description = "ID da tarefa do checklist")
    ),
    responses(
        (status = 200, description = "Tarefa marcada/desmarcada", body = ProjectResponse),
        (status = 404, description = "Projeto ou tarefa não encontrados")
    ),
    security(("x_user_id" = []))
)]
pub async fn toggle_task(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    let project = app_state.console.toggle_task(id, task_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

// POST /api/projects/{id}/files
#[utoipa::path(
    post,
    path = "/api/projects/{id}/files",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    request_body = AddFilePayload,
    responses(
        (status = 201, description = "Arquivo anexado", body = ProjectResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn add_file(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddFilePayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    payload.validate()?;
    let project = app_state
        .console
        .add_project_file(id, payload.name, payload.url)
        .await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

// POST /api/projects/{id}/accesses
#[utoipa::path(
    post,
    path = "/api/projects/{id}/accesses",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    request_body = AddAccessPayload,
    responses(
        (status = 201, description = "Acesso registrado", body = ProjectResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("x_user_id" = []))
)]
pub async fn add_access(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddAccessPayload>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    payload.validate()?;
    let access = AccessCredential {
        id: Uuid::new_v4(),
        platform: payload.platform,
        url: payload.url,
        username: payload.username,
        password: payload.password,
    };
    let project = app_state.console.add_project_access(id, access).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

// POST /api/projects/{id}/commission
#[utoipa::path(
    post,
    path = "/api/projects/{id}/commission",
    tag = "Commissions",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 201, description = "Comissão do vendedor do cliente sobre o orçamento", body = Commission),
        (status = 404, description = "Projeto, cliente ou vendedor não encontrados")
    ),
    security(("x_user_id" = []))
)]
pub async fn create_project_commission(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageCommissions)?;
    let commission = app_state.console.commission_for_project(id).await?;
    Ok((StatusCode::CREATED, Json(commission)))
}

// DELETE /api/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("x_user_id" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    require(&user, Permission::ManageProjects)?;
    app_state.console.delete::<Project>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
