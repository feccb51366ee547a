// src/db/memory.rs
//
// Implementação em memória do Entity Repository. É o dublê usado pelos
// testes (unitários e de integração) para exercitar o núcleo inteiro sem
// Postgres. As semânticas (ordenação, unicidade, agregados do dashboard)
// espelham a implementação Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentStore, AuditItemStore, PaymentStore, ReportStore, StatsStore, UserStore},
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment, ReminderKind},
        audit::{AuditItem, AuditItemChanges, NewAuditItem},
        auth::{NewUser, User, UserRole},
        dashboard::DashboardStats,
        payment::{NewPayment, Payment, PaymentStatus},
        report::{NewReport, Report, ReportStatus},
    },
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    appointments: Vec<Appointment>,
    items: Vec<AuditItem>,
    reports: Vec<Report>,
    payments: Vec<Payment>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.lock().await;
        if inner
            .users
            .iter()
            .any(|u| u.email == new.email || u.username == new.username)
        {
            return Err(AppError::Validation(
                "Email or username already in use.".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            email: new.email,
            full_name: new.full_name,
            phone: new.phone,
            role: new.role,
            is_active: true,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_active_officers(&self) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| u.role == UserRole::Officer && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let mut inner = self.inner.lock().await;
        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: new.customer_id,
            officer_id: None,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            preferred_date: new.preferred_date,
            preferred_time: new.preferred_time,
            status: AppointmentStatus::Scheduled,
            has_receipts_ready: new.has_receipts_ready,
            notes: new.notes,
            reminder_sent_at: None,
            day_of_reminder_sent_at: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        let inner = self.inner.lock().await;
        // created_at é monotônico na inserção: reverso = decrescente
        Ok(inner.appointments.iter().rev().cloned().collect())
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .appointments
            .iter()
            .rev()
            .filter(|a| a.customer_id == Some(customer_id))
            .cloned()
            .collect())
    }

    async fn list_by_officer(&self, officer_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .appointments
            .iter()
            .rev()
            .filter(|a| a.officer_id == Some(officer_id))
            .cloned()
            .collect())
    }

    async fn list_scheduled_for(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled && a.preferred_date == date)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(a) = inner.appointments.iter_mut().find(|a| a.id == id) {
            a.status = status;
            a.completed_at = completed_at;
        }
        Ok(())
    }

    async fn set_officer(&self, id: Uuid, officer_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(a) = inner.appointments.iter_mut().find(|a| a.id == id) {
            a.officer_id = Some(officer_id);
        }
        Ok(())
    }

    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        kind: ReminderKind,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(a) = inner.appointments.iter_mut().find(|a| a.id == id) {
            match kind {
                ReminderKind::TwentyFourHour => a.reminder_sent_at = Some(at),
                ReminderKind::DayOf => a.day_of_reminder_sent_at = Some(at),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuditItemStore for MemoryStore {
    async fn create(&self, new: NewAuditItem) -> Result<AuditItem, AppError> {
        let mut inner = self.inner.lock().await;
        let item = AuditItem {
            id: Uuid::new_v4(),
            appointment_id: new.appointment_id,
            category: new.category,
            description: new.description,
            estimated_value: new.estimated_value,
            serial_number: new.serial_number,
            model: new.model,
            photo_url: new.photo_url,
            receipt_url: new.receipt_url,
            notes: new.notes,
            created_at: Utc::now(),
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditItem>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_by_appointment(&self, appointment_id: Uuid) -> Result<Vec<AuditItem>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .items
            .iter()
            .rev()
            .filter(|i| i.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: AuditItemChanges) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(item) = inner.items.iter_mut().find(|i| i.id == id) {
            if let Some(category) = changes.category {
                item.category = category;
            }
            if let Some(description) = changes.description {
                item.description = description;
            }
            if let Some(value) = changes.estimated_value {
                item.estimated_value = value;
            }
            if let Some(serial) = changes.serial_number {
                item.serial_number = Some(serial);
            }
            if let Some(model) = changes.model {
                item.model = Some(model);
            }
            if let Some(photo) = changes.photo_url {
                item.photo_url = Some(photo);
            }
            if let Some(receipt) = changes.receipt_url {
                item.receipt_url = Some(receipt);
            }
            if let Some(notes) = changes.notes {
                item.notes = Some(notes);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        inner.items.retain(|i| i.id != id);
        Ok(())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn create(&self, new: NewReport) -> Result<Report, AppError> {
        let mut inner = self.inner.lock().await;
        // Laudos com falha de renderização não bloqueiam a nova tentativa.
        if inner
            .reports
            .iter()
            .any(|r| r.appointment_id == new.appointment_id && r.status != ReportStatus::Failed)
        {
            return Err(AppError::Precondition(
                "A report was already generated for this appointment.".to_string(),
            ));
        }
        let report = Report {
            id: Uuid::new_v4(),
            appointment_id: new.appointment_id,
            customer_id: new.customer_id,
            officer_id: new.officer_id,
            report_number: new.report_number,
            pdf_url: None,
            status: new.status,
            total_items_documented: new.total_items_documented,
            total_estimated_value: new.total_estimated_value,
            customer_signature: None,
            officer_signature: None,
            metadata: new.metadata,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.reports.push(report.clone());
        Ok(report)
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .reports
            .iter()
            .find(|r| r.appointment_id == appointment_id && r.status != ReportStatus::Failed)
            .cloned())
    }

    async fn report_number_exists(&self, report_number: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.reports.iter().any(|r| r.report_number == report_number))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(r) = inner.reports.iter_mut().find(|r| r.id == id) {
            r.status = status;
            r.completed_at = completed_at;
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        let mut inner = self.inner.lock().await;
        let payment = Payment {
            id: Uuid::new_v4(),
            appointment_id: new.appointment_id,
            customer_id: new.customer_id,
            provider_payment_id: new.provider_payment_id,
            amount: new.amount,
            currency: new.currency,
            service: new.service,
            status: new.status,
            payment_method: new.payment_method,
            created_at: Utc::now(),
            processed_at: new.processed_at,
        };
        inner.payments.push(payment.clone());
        Ok(payment)
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .payments
            .iter()
            .rev()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let inner = self.inner.lock().await;
        let now = Utc::now();
        let today = now.date_naive();

        let appointments_today = inner
            .appointments
            .iter()
            .filter(|a| a.created_at.date_naive() == today)
            .count() as i64;

        let reports_generated = inner
            .reports
            .iter()
            .filter(|r| r.status == ReportStatus::Completed)
            .count() as i64;

        let monthly_revenue: Decimal = inner
            .payments
            .iter()
            .filter(|p| {
                p.status == PaymentStatus::Completed
                    && p.created_at.month() == now.month()
                    && p.created_at.year() == now.year()
            })
            .map(|p| p.amount)
            .sum();

        let active_officers = inner
            .users
            .iter()
            .filter(|u| u.role == UserRole::Officer && u.is_active)
            .count() as i64;

        Ok(DashboardStats {
            appointments_today,
            reports_generated,
            monthly_revenue,
            active_officers,
        })
    }
}
