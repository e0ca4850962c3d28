// src/models/marketing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::client::LeadOrigin;
use crate::models::prospect::ServiceType;
use crate::models::validation::amount_in_range;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Instagram,
    Google,
    Tiktok,
    Linkedin,
    Email,
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Trafico,
    Conversiones,
    Alcance,
    Leads,
    Ventas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Borrador,
    Activa,
    Pausada,
    Finalizada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    Nuevo,
    Contactado,
    Calificado,
    Descartado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    Borrador,
    Programado,
    Publicado,
}

// --- CAMPANHA ---

/// `costPerLead` e `roi` são preenchidos manualmente; nada aqui os calcula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub platform: Platform,
    #[serde(rename = "type")]
    pub kind: CampaignType,
    pub state: CampaignState,
    pub client_id: Option<Uuid>,

    pub budget: Decimal,
    pub spent: Decimal,
    pub leads: u32,
    pub conversions: u32,
    pub cost_per_lead: Decimal,
    pub roi: Decimal,

    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub platform: Platform,
    #[serde(rename = "type")]
    pub kind: CampaignType,
    #[serde(default = "default_campaign_state")]
    pub state: CampaignState,
    pub client_id: Option<Uuid>,
    #[validate(custom(function = "amount_in_range"))]
    pub budget: Decimal,
    #[serde(default)]
    #[validate(custom(function = "amount_in_range"))]
    pub spent: Decimal,
    #[serde(default)]
    pub leads: u32,
    #[serde(default)]
    pub conversions: u32,
    #[serde(default)]
    pub cost_per_lead: Decimal,
    #[serde(default)]
    pub roi: Decimal,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
}

fn default_campaign_state() -> CampaignState {
    CampaignState::Borrador
}

// --- LEAD (captura antes do funil) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub origin: LeadOrigin,
    pub campaign_id: Option<Uuid>,
    pub state: LeadState,
    pub interest: Option<ServiceType>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub origin: LeadOrigin,
    pub campaign_id: Option<Uuid>,
    pub interest: Option<ServiceType>,
    pub notes: Option<String>,
}

// --- PACOTES E CONTEÚDOS ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub services: Vec<ServiceType>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPackage {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "amount_in_range"))]
    pub price: Decimal,
    #[serde(default)]
    pub services: Vec<ServiceType>,
}

/// Publicação do calendário de conteúdo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    pub platform: Platform,
    pub client_id: Option<Uuid>,
    pub state: ContentState,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub platform: Platform,
    pub client_id: Option<Uuid>,
    pub scheduled_for: DateTime<Utc>,
}
