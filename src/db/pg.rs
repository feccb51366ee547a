// src/db/pg.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AppointmentStore, AuditItemStore, PaymentStore, ReportStore, StatsStore, UserStore,
    },
    models::{
        appointment::{Appointment, AppointmentStatus, NewAppointment, ReminderKind},
        audit::{AuditItem, AuditItemChanges, NewAuditItem},
        auth::{NewUser, User},
        dashboard::DashboardStats,
        payment::{NewPayment, Payment},
        report::{NewReport, Report, ReportStatus},
    },
};

// --- Usuários ---

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, full_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte violação de chave única num erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Validation("Email or username already in use.".to_string());
                }
            }
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_active_officers(&self) -> Result<Vec<User>, AppError> {
        let officers = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'officer' AND is_active = TRUE ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(officers)
    }
}

// --- Agendamentos ---

#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentRepository {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments
                (customer_id, full_name, email, phone, address,
                 preferred_date, preferred_time, has_receipts_ready, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.customer_id)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(new.preferred_date)
        .bind(new.preferred_time)
        .bind(new.has_receipts_ready)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(appointment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(appointment)
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_officer(&self, officer_id: Uuid) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE officer_id = $1 ORDER BY created_at DESC",
        )
        .bind(officer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_scheduled_for(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        // Usa o índice (status, preferred_date)
        let rows = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE status = 'scheduled' AND preferred_date = $1",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE appointments SET status = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_officer(&self, id: Uuid, officer_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE appointments SET officer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(officer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_reminder_sent(
        &self,
        id: Uuid,
        kind: ReminderKind,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let sql = match kind {
            ReminderKind::TwentyFourHour => {
                "UPDATE appointments SET reminder_sent_at = $2 WHERE id = $1"
            }
            ReminderKind::DayOf => {
                "UPDATE appointments SET day_of_reminder_sent_at = $2 WHERE id = $1"
            }
        };
        sqlx::query(sql).bind(id).bind(at).execute(&self.pool).await?;
        Ok(())
    }
}

// --- Itens auditados ---

#[derive(Clone)]
pub struct PgAuditItemRepository {
    pool: PgPool,
}

impl PgAuditItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditItemStore for PgAuditItemRepository {
    async fn create(&self, new: NewAuditItem) -> Result<AuditItem, AppError> {
        let item = sqlx::query_as::<_, AuditItem>(
            r#"
            INSERT INTO audit_items
                (appointment_id, category, description, estimated_value,
                 serial_number, model, photo_url, receipt_url, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.appointment_id)
        .bind(new.category)
        .bind(&new.description)
        .bind(new.estimated_value)
        .bind(&new.serial_number)
        .bind(&new.model)
        .bind(&new.photo_url)
        .bind(&new.receipt_url)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditItem>, AppError> {
        let item = sqlx::query_as::<_, AuditItem>("SELECT * FROM audit_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn list_by_appointment(&self, appointment_id: Uuid) -> Result<Vec<AuditItem>, AppError> {
        // Uma única query: o snapshot que alimenta o laudo inteiro.
        let rows = sqlx::query_as::<_, AuditItem>(
            "SELECT * FROM audit_items WHERE appointment_id = $1 ORDER BY created_at DESC",
        )
        .bind(appointment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: AuditItemChanges) -> Result<(), AppError> {
        // COALESCE: campo ausente mantém o valor atual.
        sqlx::query(
            r#"
            UPDATE audit_items SET
                category        = COALESCE($2, category),
                description     = COALESCE($3, description),
                estimated_value = COALESCE($4, estimated_value),
                serial_number   = COALESCE($5, serial_number),
                model           = COALESCE($6, model),
                photo_url       = COALESCE($7, photo_url),
                receipt_url     = COALESCE($8, receipt_url),
                notes           = COALESCE($9, notes)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.category)
        .bind(changes.description)
        .bind(changes.estimated_value)
        .bind(changes.serial_number)
        .bind(changes.model)
        .bind(changes.photo_url)
        .bind(changes.receipt_url)
        .bind(changes.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM audit_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// --- Laudos ---

#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportRepository {
    async fn create(&self, new: NewReport) -> Result<Report, AppError> {
        sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports
                (appointment_id, customer_id, officer_id, report_number, status,
                 total_items_documented, total_estimated_value, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.appointment_id)
        .bind(new.customer_id)
        .bind(new.officer_id)
        .bind(&new.report_number)
        .bind(new.status)
        .bind(new.total_items_documented)
        .bind(new.total_estimated_value)
        .bind(&new.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // Índice único parcial: um laudo vivo por agendamento
                // (laudos com falha de renderização não contam).
                if db_err.is_unique_violation() {
                    return AppError::Precondition(
                        "A report was already generated for this appointment.".to_string(),
                    );
                }
            }
            AppError::Database(e)
        })
    }

    async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE appointment_id = $1 AND status <> 'failed'",
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    async fn report_number_exists(&self, report_number: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE report_number = $1",
        )
        .bind(report_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE reports SET status = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// --- Pagamentos ---

#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentRepository {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments
                (appointment_id, customer_id, provider_payment_id, amount,
                 currency, service, status, payment_method, processed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.appointment_id)
        .bind(new.customer_id)
        .bind(&new.provider_payment_id)
        .bind(new.amount)
        .bind(&new.currency)
        .bind(&new.service)
        .bind(new.status)
        .bind(&new.payment_method)
        .bind(new.processed_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// --- Dashboard ---

#[derive(Clone)]
pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PgDashboardRepository {
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        // A. Agendamentos criados hoje (pela data de criação, de propósito)
        let appointments_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments WHERE created_at::date = CURRENT_DATE",
        )
        .fetch_one(&self.pool)
        .await?;

        // B. Laudos concluídos (histórico completo)
        let reports_generated = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reports WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;

        // C. Receita do mês corrente (só pagamentos concluídos)
        let monthly_revenue = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE status = 'completed'
              AND date_trunc('month', created_at) = date_trunc('month', CURRENT_DATE)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        // D. Oficiais ativos
        let active_officers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'officer' AND is_active = TRUE",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            appointments_today,
            reports_generated,
            monthly_revenue,
            active_officers,
        })
    }
}
