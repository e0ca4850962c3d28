// src/models/prospect.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::amount_in_range;

// --- ENUMS ---

/// Etapas do funil (quadro Kanban). Valores do modelo antigo de seis etapas
/// são aceitos na leitura e convertidos para a etapa equivalente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[serde(alias = "lead")]
    Contacto,
    Cotizacion,
    #[serde(alias = "negociacion")]
    Proceso,
    #[serde(alias = "cierre")]
    Entregado,
}

impl PipelineStage {
    /// Ordem das colunas no quadro.
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::Contacto,
        PipelineStage::Cotizacion,
        PipelineStage::Proceso,
        PipelineStage::Entregado,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Contacto => "Contacto",
            PipelineStage::Cotizacion => "Cotización",
            PipelineStage::Proceso => "En proceso",
            PipelineStage::Entregado => "Entregado",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Contacto => "contacto",
            PipelineStage::Cotizacion => "cotizacion",
            PipelineStage::Proceso => "proceso",
            PipelineStage::Entregado => "entregado",
        }
    }

    /// Venda fechada/entregue.
    pub fn is_closed(&self) -> bool {
        matches!(self, PipelineStage::Entregado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    PaginaWeb,
    TiendaOnline,
    LandingPage,
    Seo,
    RedesSociales,
    Publicidad,
    Branding,
    Hosting,
    Mantenimiento,
    DesarrolloApp,
    Consultoria,
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpType {
    Llamada,
    Email,
    Reunion,
    Whatsapp,
    Visita,
    Otro,
}

// --- SEGUIMENTO (histórico de interações) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: FollowUpType,
    pub description: String,
    pub outcome: Option<String>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
}

// --- PROSPECTO (a oportunidade) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub id: Uuid,

    #[schema(example = "Ana López")]
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,

    pub stage: PipelineStage,
    #[schema(example = "40000.00")]
    pub estimated_value: Decimal,
    /// Sempre em [0, 100].
    #[schema(example = 50)]
    pub probability: u8,
    pub salesperson_id: Uuid,
    pub service_of_interest: ServiceType,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,

    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,

    // Preenchido na conversão para cliente
    pub client_id: Option<Uuid>,
    // Oportunidade perdida: mantém a etapa e guarda o motivo
    pub loss_reason: Option<String>,
}

impl Prospect {
    /// Oportunidade ainda em aberto (nem perdida, nem entregue).
    pub fn is_open(&self) -> bool {
        self.loss_reason.is_none() && !self.stage.is_closed()
    }
}

// --- ENTRADAS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProspect {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana López")]
    pub name: String,
    pub company: Option<String>,
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ana@empresa.mx")]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub phone: String,
    pub address: Option<String>,

    #[serde(default)]
    pub stage: Option<PipelineStage>,
    #[validate(custom(function = "amount_in_range"))]
    pub estimated_value: Decimal,
    /// Fora de [0, 100] é ajustado, não rejeitado.
    #[serde(default)]
    pub probability: i32,
    pub salesperson_id: Uuid,
    pub service_of_interest: ServiceType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspectPatch {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub company: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub stage: Option<PipelineStage>,
    #[validate(custom(function = "amount_in_range"))]
    pub estimated_value: Option<Decimal>,
    pub probability: Option<i32>,
    pub salesperson_id: Option<Uuid>,
    pub service_of_interest: Option<ServiceType>,
    pub notes: Option<String>,
    pub loss_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFollowUp {
    #[serde(rename = "type")]
    pub kind: FollowUpType,
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    pub outcome: Option<String>,
    pub next_follow_up: Option<DateTime<Utc>>,
}
