// src/middleware/rbac.rs
//
// Controle de acesso por papel. Cada gate é um tipo marcador; o extrator
// `RequireRole<G>` autentica e em seguida confere se o papel do usuário
// passa pelo gate, devolvendo 403 caso contrário.

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{User, UserRole},
};

pub trait RoleGate {
    fn allows(role: UserRole) -> bool;
    fn describe() -> &'static str;
}

/// Somente administradores.
pub struct AdminOnly;

impl RoleGate for AdminOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }

    fn describe() -> &'static str {
        "admin"
    }
}

/// Somente oficiais de auditoria.
pub struct OfficerOnly;

impl RoleGate for OfficerOnly {
    fn allows(role: UserRole) -> bool {
        role == UserRole::Officer
    }

    fn describe() -> &'static str {
        "officer"
    }
}

/// Equipe interna: administradores e oficiais.
pub struct Staff;

impl RoleGate for Staff {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Admin | UserRole::Officer)
    }

    fn describe() -> &'static str {
        "admin or officer"
    }
}

pub struct RequireRole<G: RoleGate> {
    pub user: User,
    _gate: PhantomData<G>,
}

impl<G, S> FromRequestParts<S> for RequireRole<G>
where
    G: RoleGate,
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !G::allows(user.role) {
            return Err(AppError::Permission(format!(
                "This action requires {} access.",
                G::describe()
            )));
        }
        Ok(Self {
            user,
            _gate: PhantomData,
        })
    }
}
