// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::prospect::PipelineStage;

// 1. Série mensal (gráfico de receitas x despesas)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    #[schema(example = "Ene")]
    pub month: String,
    pub year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

// 2. Ranking de vendedores
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub total_sales: Decimal,
    pub closed_deals: u32,
    pub goal: Decimal,
    pub commission_percent: Decimal,
    pub commission: Decimal,
    /// totalSales / goal × 100 (0 quando a meta é 0)
    pub goal_progress: Decimal,
}

// 3. Cabeçalho das colunas do quadro
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineColumn {
    pub stage: PipelineStage,
    pub label: String,
    pub count: u32,
    pub total_value: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTotals {
    pub budget: Decimal,
    pub spent: Decimal,
    pub leads: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTotals {
    pub pending: Decimal,
    pub approved: Decimal,
    pub paid: Decimal,
    pub total: Decimal,
}

// 4. Cards do topo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub weighted_pipeline_value: Decimal,
    pub average_probability: Decimal,
    pub conversion_rate: Decimal,
    pub open_prospects: u32,
    pub income_this_month: Decimal,
    pub income_last_month: Decimal,
    pub income_change: Decimal,
    pub monthly_recurring_revenue: Decimal,
}

/// Idioma dos rótulos de mês.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthLocale {
    #[default]
    Es,
    En,
}

impl MonthLocale {
    /// "es-MX" -> Es, "en" -> En, qualquer outro cai no padrão.
    pub fn from_tag(tag: &str) -> Self {
        match tag.split('-').next().unwrap_or(tag).to_ascii_lowercase().as_str() {
            "en" => MonthLocale::En,
            _ => MonthLocale::Es,
        }
    }

    /// Nome curto, capitalizado. `month` vai de 1 a 12.
    pub fn short_month(&self, month: u32) -> &'static str {
        const ES: [&str; 12] = [
            "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
        ];
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let index = (month.clamp(1, 12) - 1) as usize;
        match self {
            MonthLocale::Es => ES[index],
            MonthLocale::En => EN[index],
        }
    }
}
