// src/store/seed.rs

// Usuários embutidos. Não são persistidos: voltam daqui a cada carga.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::user::{Department, Role, User};

pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0001);
pub const SALES_LAURA_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0002);
pub const SALES_DIEGO_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0003);
pub const OPERATIONS_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0004);
pub const SUPPORT_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0005);
pub const MARKETING_ID: Uuid = Uuid::from_u128(0x0000_0001_0000_4000_8000_0000_0000_0006);

pub fn sample_users(now: DateTime<Utc>) -> Vec<User> {
    let user = |id, name: &str, email: &str, role, department| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
        department,
        monthly_goal: None,
        commission_percent: None,
        active: true,
        created_at: now,
    };

    let mut laura = user(
        SALES_LAURA_ID,
        "Laura Méndez",
        "laura@agencia.mx",
        Role::Vendedor,
        Department::Ventas,
    );
    laura.monthly_goal = Some(Decimal::from(150_000));
    laura.commission_percent = Some(Decimal::from(12));

    vec![
        user(ADMIN_ID, "Carlos Ruiz", "admin@agencia.mx", Role::Admin, Department::Direccion),
        laura,
        // sem meta nem comissão: o ranking usa os padrões
        user(SALES_DIEGO_ID, "Diego Torres", "diego@agencia.mx", Role::Vendedor, Department::Ventas),
        user(OPERATIONS_ID, "Sofía Vargas", "sofia@agencia.mx", Role::Operaciones, Department::Desarrollo),
        user(SUPPORT_ID, "Miguel Ortiz", "soporte@agencia.mx", Role::Soporte, Department::Soporte),
        user(MARKETING_ID, "Valeria Cruz", "marketing@agencia.mx", Role::Marketing, Department::Marketing),
    ]
}
