// src/handlers/mod.rs

pub mod appointments;
pub mod audit_items;
pub mod auth;
pub mod dashboard;
pub mod officers;
pub mod payments;
pub mod reports;
