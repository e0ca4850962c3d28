// src/handlers.rs

pub mod clients;
pub mod commissions;
pub mod dashboard;
pub mod finance;
pub mod marketing;
pub mod projects;
pub mod prospects;
pub mod quotes;
pub mod tickets;
pub mod users;
