// src/middleware/mod.rs

pub mod auth;
pub mod rbac;

pub use auth::{AuthenticatedUser, MaybeUser};
pub use rbac::{AdminOnly, OfficerOnly, RequireRole, Staff};
