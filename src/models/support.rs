// src/models/support.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Baja,
    Media,
    Alta,
    Urgente,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Abierto,
    EnProceso,
    Resuelto,
    Cerrado,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketReply {
    pub id: Uuid,
    pub author_id: Option<Uuid>,
    pub message: String,
    pub from_client: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[schema(example = "TKT-2024-001")]
    pub number: String,
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub replies: Vec<TicketReply>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub priority: TicketPriority,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketReply {
    #[validate(length(min = 1, message = "required"))]
    pub message: String,
    #[serde(default)]
    pub from_client: bool,
}
