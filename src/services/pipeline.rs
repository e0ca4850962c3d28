// src/services/pipeline.rs

//! Máquina de etapas do funil: contacto -> cotizacion -> proceso -> entregado.
//! Qualquer etapa pode ir para qualquer outra; nenhuma transição é bloqueada.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    client::{Client, LeadOrigin},
    prospect::{FollowUp, NewFollowUp, PipelineStage, Prospect},
};

/// O que fazer quando um prospecto já convertido é convertido de novo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    /// Comportamento legado: cada chamada cria um cliente novo.
    Repeat,
    /// Devolve o cliente existente sem criar nada.
    #[default]
    Idempotent,
    /// Falha com `AlreadyConverted`.
    Reject,
}

impl FromStr for ConversionPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "repeat" => Ok(ConversionPolicy::Repeat),
            "idempotent" => Ok(ConversionPolicy::Idempotent),
            "reject" => Ok(ConversionPolicy::Reject),
            other => Err(format!("política de conversão desconhecida: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageChange {
    /// Soltou na mesma coluna: nada muda, nem o timestamp.
    Unchanged,
    Moved { from: PipelineStage, to: PipelineStage },
}

pub fn apply_stage_change(
    prospect: &mut Prospect,
    target: PipelineStage,
    now: DateTime<Utc>,
) -> StageChange {
    if prospect.stage == target {
        return StageChange::Unchanged;
    }
    let from = prospect.stage;
    prospect.stage = target;
    touch(prospect, now);
    StageChange::Moved { from, to: target }
}

/// Monta o registro de cliente a partir do prospecto.
pub fn client_from_prospect(
    prospect: &Prospect,
    client_id: Uuid,
    default_country: &str,
    now: DateTime<Utc>,
) -> Client {
    Client {
        id: client_id,
        name: prospect.name.clone(),
        company: prospect.company.clone(),
        email: prospect.email.clone(),
        phone: prospect.phone.clone(),
        address: prospect.address.clone(),
        city: None,
        country: default_country.to_string(),
        origin_lead: LeadOrigin::Referido,
        sales_assignee: prospect.salesperson_id,
        total_value: prospect.estimated_value,
        active_projects_count: 0,
        notes: prospect.notes.clone(),
        prospect_id: Some(prospect.id),
        created_at: now,
    }
}

/// Segunda metade da conversão: etapa fechada + vínculo com o cliente.
pub fn mark_converted(prospect: &mut Prospect, client_id: Uuid, now: DateTime<Utc>) {
    prospect.stage = PipelineStage::Entregado;
    prospect.client_id = Some(client_id);
    touch(prospect, now);
}

/// Registra uma interação. Não mexe em etapa nem probabilidade.
pub fn append_follow_up(
    prospect: &mut Prospect,
    input: NewFollowUp,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> FollowUp {
    let entry = FollowUp {
        id: Uuid::new_v4(),
        kind: input.kind,
        description: input.description,
        outcome: input.outcome,
        next_follow_up: input.next_follow_up,
        user_id,
        date: now,
    };
    prospect.follow_ups.push(entry.clone());
    touch(prospect, now);
    entry
}

// lastUpdatedAt nunca volta para antes de createdAt
pub(crate) fn touch(prospect: &mut Prospect, now: DateTime<Utc>) {
    prospect.last_updated_at = now.max(prospect.created_at);
}

/// Uma coluna do quadro com os prospectos dela.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub stage: PipelineStage,
    pub label: String,
    pub prospects: Vec<Prospect>,
}

pub fn board<'a, I>(prospects: I) -> Vec<BoardColumn>
where
    I: IntoIterator<Item = &'a Prospect>,
{
    let mut columns: Vec<BoardColumn> = PipelineStage::ALL
        .iter()
        .map(|stage| BoardColumn {
            stage: *stage,
            label: stage.label().to_string(),
            prospects: Vec::new(),
        })
        .collect();
    for prospect in prospects {
        if let Some(column) = columns.iter_mut().find(|c| c.stage == prospect.stage) {
            column.prospects.push(prospect.clone());
        }
    }
    columns
}

// =========================================================================
//  ARRASTAR E SOLTAR
// =========================================================================

/// Um único arrasto ativo por vez.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<Uuid>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Começar outro arrasto substitui o anterior.
    pub fn start(&mut self, prospect_id: Uuid) {
        self.active = Some(prospect_id);
    }

    pub fn active(&self) -> Option<Uuid> {
        self.active
    }

    /// `None` = soltou fora de uma coluna válida. Sempre limpa o slot.
    pub fn drop_on(&mut self, target: Option<PipelineStage>) -> Option<(Uuid, PipelineStage)> {
        let dragged = self.active.take()?;
        target.map(|stage| (dragged, stage))
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
