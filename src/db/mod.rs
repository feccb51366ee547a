// src/db/mod.rs
//
// O Entity Repository é a fronteira de persistência do núcleo: um trait de
// CRUD por entidade. A implementação Postgres fica em `pg`; a em memória
// (`memory`) serve os testes sem banco.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment, ReminderKind},
        audit::{AuditItem, AuditItemChanges, NewAuditItem},
        auth::{NewUser, User},
        dashboard::DashboardStats,
        payment::{NewPayment, Payment},
        report::{NewReport, Report, ReportStatus},
    },
};

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    // Só oficiais ativos: é a lista de elegíveis para atribuição.
    async fn list_active_officers(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError>;
    // Todas as listagens vêm ordenadas por created_at decrescente.
    async fn list_all(&self) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, AppError>;
    async fn list_by_officer(&self, officer_id: Uuid) -> Result<Vec<Appointment>, AppError>;
    // Varredura de lembretes: agendados para uma data específica.
    async fn list_scheduled_for(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppError>;
    // completed_at acompanha o status: Some ao concluir, None nos demais.
    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;
    async fn set_officer(&self, id: Uuid, officer_id: Uuid) -> Result<(), AppError>;
    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        kind: ReminderKind,
        at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuditItemStore: Send + Sync {
    async fn create(&self, new: NewAuditItem) -> Result<AuditItem, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditItem>, AppError>;
    // Mais recente primeiro: a ordem alimenta o indicador de progresso.
    async fn list_by_appointment(&self, appointment_id: Uuid) -> Result<Vec<AuditItem>, AppError>;
    async fn update(&self, id: Uuid, changes: AuditItemChanges) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, new: NewReport) -> Result<Report, AppError>;
    // O laudo "vivo" do agendamento; laudos com falha de renderização
    // ficam de fora (eles não bloqueiam nova tentativa).
    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, AppError>;
    async fn report_number_exists(&self, report_number: &str) -> Result<bool, AppError>;
    async fn set_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError>;
    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Payment>, AppError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError>;
}
