// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::prospect::ServiceType;
use crate::models::validation::{amount_in_range, percentage};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Ingreso, // Entrada
    Egreso,  // Saída
}

/// Categorias de entrada e de saída vivem no mesmo enum;
/// `kind()` diz a qual tipo cada uma pertence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    // Ingreso
    Proyecto,
    ServicioRecurrente,
    Consultoria,
    OtroIngreso,
    // Egreso
    Nomina,
    Software,
    Publicidad,
    Oficina,
    Impuestos,
    Comisiones,
    OtroGasto,
}

impl TransactionCategory {
    pub fn kind(&self) -> TransactionType {
        match self {
            TransactionCategory::Proyecto
            | TransactionCategory::ServicioRecurrente
            | TransactionCategory::Consultoria
            | TransactionCategory::OtroIngreso => TransactionType::Ingreso,
            _ => TransactionType::Egreso,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Transferencia,
    Efectivo,
    Tarjeta,
    Paypal,
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecurringState {
    Activo,
    Pausado,
    Cancelado,
    Vencido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommissionState {
    Pendiente,
    Aprobada,
    Pagada,
}

impl CommissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionState::Pendiente => "pendiente",
            CommissionState::Aprobada => "aprobada",
            CommissionState::Pagada => "pagada",
        }
    }

    /// Só anda para frente: pendiente -> aprobada -> pagada (pular a aprovação é permitido).
    pub fn can_advance_to(&self, next: CommissionState) -> bool {
        matches!(
            (self, next),
            (CommissionState::Pendiente, CommissionState::Aprobada)
                | (CommissionState::Pendiente, CommissionState::Pagada)
                | (CommissionState::Aprobada, CommissionState::Pagada)
        )
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: TransactionCategory,
    #[schema(example = "15000.00")]
    pub amount: Decimal,
    pub description: String,
    #[schema(value_type = String, format = Date, example = "2024-05-20")]
    pub date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: TransactionCategory,
    #[validate(custom(function = "amount_in_range"))]
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayment {
    pub id: Uuid,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

/// Assinatura mensal (hosting, manutenção...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringService {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service: ServiceType,
    pub description: Option<String>,
    pub monthly_price: Decimal,
    #[schema(value_type = String, format = Date)]
    pub renewal_date: NaiveDate,
    pub state: RecurringState,
    #[serde(default)]
    pub payments: Vec<ServicePayment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringService {
    pub client_id: Uuid,
    pub service: ServiceType,
    pub description: Option<String>,
    #[validate(custom(function = "amount_in_range"))]
    pub monthly_price: Decimal,
    #[schema(value_type = String, format = Date)]
    pub renewal_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewServicePayment {
    #[validate(custom(function = "amount_in_range"))]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,
    pub salesperson_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub sale_amount: Decimal,
    pub percentage: Decimal,
    /// saleAmount × percentage / 100
    pub amount: Decimal,
    pub state: CommissionState,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Commission {
    pub fn amount_for(sale_amount: Decimal, percentage: Decimal) -> Decimal {
        sale_amount * percentage / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCommission {
    pub salesperson_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    #[validate(custom(function = "amount_in_range"))]
    pub sale_amount: Decimal,
    #[validate(custom(function = "percentage"))]
    pub percentage: Decimal,
}
