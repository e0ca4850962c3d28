// src/services.rs

pub mod console_service;
pub mod metrics;
pub mod pipeline;
