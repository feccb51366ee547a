//src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppState;

// Monta o router completo. Fica na lib (e não no main) para os testes de
// integração conseguirem dirigir a API inteira com stores em memória.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Autenticação (rotas públicas)
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/users/me", get(handlers::auth::get_me))
        // Agendamentos: o POST é público (guest booking); o resto exige sessão
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments/{id}/status",
            patch(handlers::appointments::update_status),
        )
        .route(
            "/api/appointments/{id}/assign-officer",
            patch(handlers::appointments::assign_officer),
        )
        // Itens auditados. O GET usa o mesmo segmento, mas o parâmetro é o id
        // do agendamento (mesmo contrato do serviço antigo).
        .route("/api/audit-items", post(handlers::audit_items::create_item))
        .route(
            "/api/audit-items/{id}",
            get(handlers::audit_items::list_items)
                .patch(handlers::audit_items::update_item)
                .delete(handlers::audit_items::delete_item),
        )
        .route(
            "/api/audit-items/{id}/progress",
            get(handlers::audit_items::get_progress),
        )
        // Laudos
        .route(
            "/api/reports/generate/{appointment_id}",
            post(handlers::reports::generate_report),
        )
        // Administração
        .route("/api/officers", get(handlers::officers::list_officers))
        .route("/api/dashboard/stats", get(handlers::dashboard::get_stats))
        // Pagamentos (registro de cobranças já capturadas externamente)
        .route(
            "/api/payments",
            post(handlers::payments::record_payment).get(handlers::payments::list_my_payments),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(state)
}
