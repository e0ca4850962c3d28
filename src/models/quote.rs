// src/models/quote.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::prospect::ServiceType;
use crate::models::validation::{amount_in_range, percentage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteState {
    Borrador,
    Enviada,
    Aceptada,
    Rechazada,
    Vencida,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    pub id: Uuid,
    pub service: ServiceType,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// quantity × unitPrice
    pub total: Decimal,
}

/// Resultado da fórmula de totais da cotização.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_base: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl QuoteTotals {
    // subtotal -> desconto -> base -> imposto -> total
    /// `None` quando alguma etapa estoura o `Decimal`.
    pub fn compute(
        items: &[QuoteLineItem],
        discount_percent: Decimal,
        tax_percent: Decimal,
    ) -> Option<Self> {
        let subtotal = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total))?;
        let discount_amount = subtotal.checked_mul(discount_percent)? / Decimal::ONE_HUNDRED;
        let tax_base = subtotal.checked_sub(discount_amount)?;
        let tax_amount = tax_base.checked_mul(tax_percent)? / Decimal::ONE_HUNDRED;
        Some(Self {
            subtotal,
            discount_amount,
            tax_base,
            tax_amount,
            total: tax_base.checked_add(tax_amount)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    #[schema(example = "COT-2024-001")]
    pub number: String,
    pub prospect_id: Uuid,
    pub client_id: Option<Uuid>,

    #[serde(default)]
    pub items: Vec<QuoteLineItem>,
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,

    pub state: QuoteState,
    pub validity_days: u32,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Recalcula os totais. Em caso de estouro nada é alterado.
    pub fn apply_totals(&mut self) -> Option<QuoteTotals> {
        let totals = QuoteTotals::compute(&self.items, self.discount_percent, self.tax_percent)?;
        self.subtotal = totals.subtotal;
        self.discount_amount = totals.discount_amount;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
        Some(totals)
    }

    // Só exibição: nada muda o estado para "vencida" automaticamente.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .checked_add_signed(Duration::days(i64::from(self.validity_days)))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state, QuoteState::Borrador | QuoteState::Enviada)
            && self.expires_at().is_some_and(|expires| now > expires)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub service: ServiceType,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "amount_in_range"))]
    pub quantity: Decimal,
    #[validate(custom(function = "amount_in_range"))]
    pub unit_price: Decimal,
}

impl NewLineItem {
    /// `None` se quantidade × preço estourar o `Decimal`.
    pub fn into_line(self) -> Option<QuoteLineItem> {
        Some(QuoteLineItem {
            id: Uuid::new_v4(),
            total: self.quantity.checked_mul(self.unit_price)?,
            service: self.service,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub prospect_id: Uuid,
    pub client_id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"), nested)]
    pub items: Vec<NewLineItem>,
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub discount_percent: Decimal,
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub tax_percent: Decimal,
    #[serde(default = "default_validity_days")]
    #[validate(range(min = 1, max = 3650, message = "A validade deve ficar entre 1 e 3650 dias."))]
    pub validity_days: u32,
    pub notes: Option<String>,
}

fn default_validity_days() -> u32 {
    30
}
