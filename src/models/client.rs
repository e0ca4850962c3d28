// src/models/client.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::amount_in_range;

/// Canal de origem de um cliente ou lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadOrigin {
    Referido,
    Facebook,
    Instagram,
    Google,
    SitioWeb,
    Linkedin,
    Whatsapp,
    Otro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    #[schema(example = "México")]
    pub country: String,

    pub origin_lead: LeadOrigin,
    pub sales_assignee: Uuid,

    // Valores gravados na criação/conversão. Os números "vivos" estão em ClientView.
    pub total_value: Decimal,
    pub active_projects_count: u32,

    pub notes: Option<String>,
    /// Prospecto de origem, quando veio de uma conversão.
    pub prospect_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Cliente + agregados recalculados a cada leitura a partir de projetos e transações.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    #[serde(flatten)]
    pub client: Client,
    pub income_total: Decimal,
    pub active_projects: u32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub origin_lead: LeadOrigin,
    pub sales_assignee: Uuid,
    #[serde(default)]
    #[validate(custom(function = "amount_in_range"))]
    pub total_value: Decimal,
    pub notes: Option<String>,
}
