// src/models/user.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Vendedor,
    Operaciones,
    Soporte,
    Marketing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Direccion,
    Ventas,
    Desarrollo,
    Diseno,
    Marketing,
    Soporte,
}

/// O que cada tela/comando exige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManagePipeline,
    ViewAllProspects,
    ManageClients,
    ManageQuotes,
    ManageProjects,
    ManageTickets,
    ManageFinance,
    ManageCommissions,
    ManageMarketing,
    ViewDashboard,
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Role::Admin => true,
            Role::Vendedor => matches!(
                permission,
                ManagePipeline | ManageClients | ManageQuotes | ViewDashboard
            ),
            Role::Operaciones => matches!(permission, ManageProjects | ManageTickets),
            Role::Soporte => matches!(permission, ManageTickets),
            Role::Marketing => matches!(permission, ManageMarketing),
        }
    }

    /// Entra no ranking de vendas.
    pub fn sells(&self) -> bool {
        matches!(self, Role::Admin | Role::Vendedor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Department,
    // Só fazem sentido para vendedores
    pub monthly_goal: Option<Decimal>,
    pub commission_percent: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn can(&self, permission: Permission) -> bool {
        self.active && self.role.allows(permission)
    }

    /// Dono do registro, ou alguém que enxerga o funil inteiro.
    pub fn sees_salesperson(&self, salesperson_id: Uuid) -> bool {
        self.id == salesperson_id || self.can(Permission::ViewAllProspects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salesperson_permissions() {
        assert!(Role::Vendedor.allows(Permission::ManagePipeline));
        assert!(!Role::Vendedor.allows(Permission::ViewAllProspects));
        assert!(!Role::Vendedor.allows(Permission::ManageFinance));
        assert!(Role::Admin.allows(Permission::ManageCommissions));
        assert!(Role::Soporte.allows(Permission::ManageTickets));
        assert!(!Role::Marketing.allows(Permission::ManageTickets));
    }

    #[test]
    fn only_sellers_rank() {
        assert!(Role::Admin.sells());
        assert!(Role::Vendedor.sells());
        assert!(!Role::Operaciones.sells());
    }
}
