// src/models/project.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::prospect::ServiceType;
use crate::models::validation::amount_in_range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pendiente,
    EnDesarrollo,
    EnRevision,
    Entregado,
    Cancelado,
}

impl ProjectStatus {
    /// Projeto que ainda ocupa a equipe.
    pub fn is_active(&self) -> bool {
        !matches!(self, ProjectStatus::Entregado | ProjectStatus::Cancelado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Baja,
    Media,
    Alta,
    Urgente,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistTask {
    pub id: Uuid,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Acessos do cliente (painel de hosting, CMS, redes...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessCredential {
    pub id: Uuid,
    pub platform: String,
    pub url: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub service: ServiceType,

    pub status: ProjectStatus,
    pub priority: Priority,
    /// 0..=100, informado pela equipe.
    pub progress: u8,
    pub developer_ids: Vec<Uuid>,
    pub budget: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-05-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub checklist: Vec<ChecklistTask>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
    #[serde(default)]
    pub accesses: Vec<AccessCredential>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Percentual de tarefas concluídas. Não altera `progress`.
    pub fn checklist_completion(&self) -> u8 {
        if self.checklist.is_empty() {
            return 0;
        }
        let done = self.checklist.iter().filter(|task| task.done).count();
        ((done * 100) / self.checklist.len()) as u8
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub service: ServiceType,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[validate(length(min = 1, message = "at_least_one_developer"))]
    pub developer_ids: Vec<Uuid>,
    #[validate(custom(function = "amount_in_range"))]
    pub budget: Decimal,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub checklist: Vec<String>,
}

fn default_priority() -> Priority {
    Priority::Media
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<i32>,
    pub developer_ids: Option<Vec<Uuid>>,
    #[validate(custom(function = "amount_in_range"))]
    pub budget: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn checklist_completion_counts_done_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut project = Project {
            id: Uuid::new_v4(),
            name: "Sitio".into(),
            description: None,
            client_id: Uuid::new_v4(),
            quote_id: None,
            service: ServiceType::PaginaWeb,
            status: ProjectStatus::EnDesarrollo,
            priority: Priority::Media,
            progress: 10,
            developer_ids: vec![Uuid::new_v4()],
            budget: Decimal::from(1000),
            start_date: now.date_naive(),
            due_date: None,
            checklist: Vec::new(),
            files: Vec::new(),
            accesses: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(project.checklist_completion(), 0);

        for (i, done) in [true, false, true].into_iter().enumerate() {
            project.checklist.push(ChecklistTask {
                id: Uuid::new_v4(),
                title: format!("tarea {i}"),
                done,
            });
        }
        assert_eq!(project.checklist_completion(), 66);
        assert_eq!(project.progress, 10);
    }
}
