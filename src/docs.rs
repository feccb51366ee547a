// src/docs.rs
//
// Documentação OpenAPI servida em /docs via Swagger UI.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::models::{
    appointment::{
        Appointment, AppointmentStatus, AssignOfficerPayload, CreateAppointmentPayload, TimeSlot,
        UpdateStatusPayload,
    },
    audit::{
        AuditItem, AuditProgress, CreateAuditItemPayload, ItemCategory, UpdateAuditItemPayload,
    },
    auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, User, UserRole},
    dashboard::DashboardStats,
    payment::{Payment, PaymentStatus, RecordPaymentPayload},
    report::{Report, ReportResponse, ReportStatus},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::get_me,
        crate::handlers::appointments::create_appointment,
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::update_status,
        crate::handlers::appointments::assign_officer,
        crate::handlers::audit_items::create_item,
        crate::handlers::audit_items::list_items,
        crate::handlers::audit_items::get_progress,
        crate::handlers::audit_items::update_item,
        crate::handlers::audit_items::delete_item,
        crate::handlers::reports::generate_report,
        crate::handlers::officers::list_officers,
        crate::handlers::dashboard::get_stats,
        crate::handlers::payments::record_payment,
        crate::handlers::payments::list_my_payments,
    ),
    components(schemas(
        User,
        UserRole,
        RegisterUserPayload,
        LoginUserPayload,
        AuthResponse,
        Appointment,
        AppointmentStatus,
        TimeSlot,
        CreateAppointmentPayload,
        UpdateStatusPayload,
        AssignOfficerPayload,
        AuditItem,
        ItemCategory,
        CreateAuditItemPayload,
        UpdateAuditItemPayload,
        AuditProgress,
        Report,
        ReportStatus,
        ReportResponse,
        Payment,
        PaymentStatus,
        RecordPaymentPayload,
        DashboardStats,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registro, login e sessão"),
        (name = "appointments", description = "Agendamento de visitas de auditoria"),
        (name = "audit-items", description = "Itens documentados durante a visita"),
        (name = "reports", description = "Geração do laudo oficial em PDF"),
        (name = "payments", description = "Registro de cobranças"),
        (name = "admin", description = "Painel administrativo"),
    ),
    info(
        title = "SecureHome Audit API",
        description = "Agendamento de auditorias domiciliares de segurança, documentação de itens de valor e emissão de laudos em PDF."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
