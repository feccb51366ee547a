// src/services/mod.rs

pub mod appointment_service;
pub mod audit_service;
pub mod auth;
pub mod notifications;
pub mod pdf_service;
pub mod report_service;
pub mod reminder;
