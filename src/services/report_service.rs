// src/services/report_service.rs
//
// Geração do laudo oficial: uma única leitura do diário alimenta tanto os
// agregados persistidos quanto a tabela renderizada. Um agendamento tem no
// máximo um laudo; o sucesso fecha o agendamento.

use std::sync::Arc;

use base64::Engine;
use chrono::{Datelike, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentStore, AuditItemStore, ReportStore, UserStore},
    models::{
        appointment::AppointmentStatus,
        audit::DOCUMENTATION_TARGET,
        auth::{User, UserRole},
        report::{NewReport, ReportResponse, ReportStatus, ReportTotals},
    },
    services::{
        notifications::NotificationSender,
        pdf_service::{ReportDocument, ReportRenderer},
    },
};

const REPORT_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportStore>,
    items: Arc<dyn AuditItemStore>,
    appointments: Arc<dyn AppointmentStore>,
    users: Arc<dyn UserStore>,
    renderer: Arc<dyn ReportRenderer>,
    notifier: Arc<dyn NotificationSender>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        items: Arc<dyn AuditItemStore>,
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserStore>,
        renderer: Arc<dyn ReportRenderer>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            reports,
            items,
            appointments,
            users,
            renderer,
            notifier,
        }
    }

    pub async fn generate(
        &self,
        appointment_id: Uuid,
        caller: &User,
    ) -> Result<ReportResponse, AppError> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

        if caller.role != UserRole::Admin && appointment.officer_id != Some(caller.id) {
            return Err(AppError::Permission(
                "Only an admin or the assigned officer can generate this report.".to_string(),
            ));
        }
        if appointment.status.is_terminal() {
            return Err(AppError::Precondition(
                "Cannot generate a report for a completed or cancelled appointment.".to_string(),
            ));
        }

        let officer_id = appointment.officer_id.ok_or_else(|| {
            AppError::Precondition(
                "An officer must be assigned before generating the report.".to_string(),
            )
        })?;
        let customer_id = appointment.customer_id.ok_or_else(|| {
            AppError::Precondition(
                "The appointment must be linked to a customer account to generate a report."
                    .to_string(),
            )
        })?;
        if self.reports.find_by_appointment(appointment_id).await?.is_some() {
            return Err(AppError::Precondition(
                "A report was already generated for this appointment.".to_string(),
            ));
        }

        // Foto única do diário: agregados e tabela saem da mesma leitura.
        let items = self.items.list_by_appointment(appointment_id).await?;
        if items.is_empty() {
            return Err(AppError::Precondition(
                "Cannot generate a report with no documented items.".to_string(),
            ));
        }
        let totals = ReportTotals::from_items(&items);

        let officer = self
            .users
            .find_by_id(officer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assigned officer not found.".to_string()))?;

        let report_number = self.unique_report_number().await?;
        let metadata = json!({
            "documentedCount": totals.total_items,
            "targetCount": DOCUMENTATION_TARGET,
            "itemsWithReceipt": totals.items_with_receipt,
            "itemsWithPhoto": totals.items_with_photo,
        });

        let mut report = self
            .reports
            .create(NewReport {
                appointment_id,
                customer_id,
                officer_id,
                report_number,
                status: ReportStatus::Generating,
                total_items_documented: totals.total_items,
                total_estimated_value: totals.total_value,
                metadata: Some(metadata),
            })
            .await?;

        let rendered = self.renderer.render(&ReportDocument {
            report_id: report.id,
            report_number: &report.report_number,
            appointment: &appointment,
            officer: &officer,
            items: &items,
            totals: &totals,
        });
        let pdf_bytes = match rendered {
            Ok(bytes) => bytes,
            Err(err) => {
                // Laudo marcado como falho; o agendamento fica como está
                // para permitir nova tentativa.
                self.reports
                    .set_status(report.id, ReportStatus::Failed, None)
                    .await?;
                tracing::error!(report_id = %report.id, error = %err, "Falha ao renderizar o laudo");
                return Err(err);
            }
        };

        let now = Utc::now();
        self.reports
            .set_status(report.id, ReportStatus::Completed, Some(now))
            .await?;
        self.appointments
            .set_status(appointment_id, AppointmentStatus::Completed, Some(now))
            .await?;
        report.status = ReportStatus::Completed;
        report.completed_at = Some(now);

        tracing::info!(
            report_id = %report.id,
            report_number = %report.report_number,
            items = totals.total_items,
            "✅ Laudo gerado"
        );
        self.notifier
            .send_report_ready(&appointment, &report.report_number)
            .await;

        let pdf_data = base64::engine::general_purpose::STANDARD.encode(&pdf_bytes);
        Ok(ReportResponse { report, pdf_data })
    }

    // RPT-<ano>-<6 dígitos>. O sufixo vem de bytes aleatórios de um UUID;
    // colisão com laudo existente só custa mais uma rodada.
    async fn unique_report_number(&self) -> Result<String, AppError> {
        let year = Utc::now().year();
        for _ in 0..REPORT_NUMBER_ATTEMPTS {
            let candidate = format!("RPT-{year}-{:06}", random_suffix());
            if !self.reports.report_number_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "could not allocate a unique report number after {REPORT_NUMBER_ATTEMPTS} attempts"
        )))
    }
}

fn random_suffix() -> u32 {
    let bytes = *Uuid::new_v4().as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{
            appointment::{Appointment, NewAppointment, TimeSlot},
            audit::{ItemCategory, NewAuditItem},
            auth::NewUser,
        },
        services::{notifications::RecordingNotifier, pdf_service::PdfService},
    };
    use chrono::Days;
    use rust_decimal::Decimal;

    // Compositor que sempre falha, para exercitar o caminho de erro.
    struct BrokenRenderer;

    impl ReportRenderer for BrokenRenderer {
        fn render(&self, _document: &ReportDocument<'_>) -> Result<Vec<u8>, AppError> {
            Err(AppError::Render("font table corrupted".to_string()))
        }
    }

    struct Fixture {
        service: ReportService,
        store: MemoryStore,
        notifier: RecordingNotifier,
        officer: User,
        appointment: Appointment,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let service = ReportService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(PdfService::new()),
            Arc::new(notifier.clone()),
        );

        let customer = UserStore::create(
            &store,
            NewUser {
                username: "casey".to_string(),
                password_hash: "x".to_string(),
                email: "casey@example.com".to_string(),
                full_name: "Casey Holt".to_string(),
                phone: None,
                role: UserRole::Homeowner,
            },
        )
        .await
        .unwrap();
        let officer = UserStore::create(
            &store,
            NewUser {
                username: "reyes".to_string(),
                password_hash: "x".to_string(),
                email: "reyes@example.com".to_string(),
                full_name: "Officer Reyes".to_string(),
                phone: None,
                role: UserRole::Officer,
            },
        )
        .await
        .unwrap();

        let appointment = AppointmentStore::create(
            &store,
            NewAppointment {
                customer_id: Some(customer.id),
                full_name: customer.full_name.clone(),
                email: customer.email.clone(),
                phone: "555-0101".to_string(),
                address: "4 Oak Lane".to_string(),
                preferred_date: Utc::now().date_naive() + Days::new(2),
                preferred_time: TimeSlot::OnePm,
                has_receipts_ready: true,
                notes: None,
            },
        )
        .await
        .unwrap();
        store.set_officer(appointment.id, officer.id).await.unwrap();
        AppointmentStore::set_status(&store, appointment.id, AppointmentStatus::InProgress, None)
            .await
            .unwrap();
        let appointment = AppointmentStore::find_by_id(&store, appointment.id)
            .await
            .unwrap()
            .unwrap();

        Fixture {
            service,
            store,
            notifier,
            officer,
            appointment,
        }
    }

    async fn document_item(fixture: &Fixture, description: &str, cents: i64) {
        AuditItemStore::create(
            &fixture.store,
            NewAuditItem {
                appointment_id: fixture.appointment.id,
                category: ItemCategory::Jewelry,
                description: description.to_string(),
                estimated_value: Decimal::new(cents, 2),
                serial_number: None,
                model: None,
                photo_url: None,
                receipt_url: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn zero_items_is_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .generate(f.appointment.id, &f.officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn generation_aggregates_closes_and_notifies() {
        let f = fixture().await;
        document_item(&f, "Gold necklace", 10000).await;
        document_item(&f, "Silver watch", 20000).await;
        document_item(&f, "Diamond ring", 30050).await;

        let response = f.service.generate(f.appointment.id, &f.officer).await.unwrap();

        assert_eq!(response.report.total_items_documented, 3);
        assert_eq!(response.report.total_estimated_value, Decimal::new(60050, 2));
        assert_eq!(response.report.status, ReportStatus::Completed);
        assert!(response.report.completed_at.is_some());
        assert!(!response.pdf_data.is_empty());

        let appointment = AppointmentStore::find_by_id(&f.store, f.appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Completed);
        assert!(appointment.completed_at.is_some());
        assert_eq!(f.notifier.count_of("report-ready"), 1);
    }

    #[tokio::test]
    async fn second_report_for_the_same_appointment_is_rejected() {
        let f = fixture().await;
        document_item(&f, "Gold necklace", 10000).await;

        f.service.generate(f.appointment.id, &f.officer).await.unwrap();
        let err = f
            .service
            .generate(f.appointment.id, &f.officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    fn with_renderer(f: &Fixture, renderer: Arc<dyn ReportRenderer>) -> ReportService {
        ReportService::new(
            Arc::new(f.store.clone()),
            Arc::new(f.store.clone()),
            Arc::new(f.store.clone()),
            Arc::new(f.store.clone()),
            renderer,
            Arc::new(f.notifier.clone()),
        )
    }

    #[tokio::test]
    async fn render_failure_leaves_the_appointment_open_for_retry() {
        let f = fixture().await;
        document_item(&f, "Gold necklace", 10000).await;

        let broken = with_renderer(&f, Arc::new(BrokenRenderer));
        let err = broken
            .generate(f.appointment.id, &f.officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Render(_)));

        // O laudo falho fica registrado, mas não é o laudo "vivo".
        assert!(ReportStore::find_by_appointment(&f.store, f.appointment.id)
            .await
            .unwrap()
            .is_none());
        let appointment = AppointmentStore::find_by_id(&f.store, f.appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::InProgress);
        assert_eq!(f.notifier.count_of("report-ready"), 0);

        // Nova tentativa com o compositor real fecha o agendamento.
        let response = f.service.generate(f.appointment.id, &f.officer).await.unwrap();
        assert_eq!(response.report.status, ReportStatus::Completed);
        let appointment = AppointmentStore::find_by_id(&f.store, f.appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn unassigned_officer_cannot_generate() {
        let f = fixture().await;
        document_item(&f, "Gold necklace", 10000).await;
        let stranger = UserStore::create(
            &f.store,
            NewUser {
                username: "stranger".to_string(),
                password_hash: "x".to_string(),
                email: "stranger@example.com".to_string(),
                full_name: "Stranger".to_string(),
                phone: None,
                role: UserRole::Officer,
            },
        )
        .await
        .unwrap();

        let err = f
            .service
            .generate(f.appointment.id, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Permission(_)));
    }

    #[test]
    fn report_numbers_keep_the_human_readable_shape() {
        let year = Utc::now().year();
        for _ in 0..20 {
            let number = format!("RPT-{year}-{:06}", random_suffix());
            let parts: Vec<_> = number.split('-').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], "RPT");
            assert_eq!(parts[1], year.to_string());
            assert_eq!(parts[2].len(), 6);
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
