// src/services/reminder.rs
//
// Varreduras de lembrete. Cada envio carimba o timestamp correspondente no
// agendamento, então repetir a varredura nunca duplica e-mail. Os corpos
// recebem `now` de fora para serem testáveis sem relógio.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Days, Utc};

use crate::{
    common::error::AppError,
    db::AppointmentStore,
    models::appointment::ReminderKind,
    services::notifications::NotificationSender,
};

const HOURLY: Duration = Duration::from_secs(60 * 60);
const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct ReminderService {
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl ReminderService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            appointments,
            notifier,
        }
    }

    /// Dispara os dois laços em background e devolve.
    pub fn spawn(self) {
        let hourly = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(HOURLY);
            loop {
                interval.tick().await;
                match hourly.run_24_hour_sweep(Utc::now()).await {
                    Ok(sent) if sent > 0 => {
                        tracing::info!(sent, "✅ Lembretes de 24h enviados");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "Varredura de 24h falhou"),
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(DAILY);
            loop {
                interval.tick().await;
                match self.run_day_of_sweep(Utc::now()).await {
                    Ok(sent) if sent > 0 => {
                        tracing::info!(sent, "✅ Lembretes do dia enviados");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "Varredura do dia falhou"),
                }
            }
        });
    }

    /// Agendamentos de amanhã que ainda não receberam o lembrete de 24h.
    pub async fn run_24_hour_sweep(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let tomorrow = now.date_naive() + Days::new(1);
        let mut sent = 0;
        for appointment in self.appointments.list_scheduled_for(tomorrow).await? {
            if appointment.reminder_sent_at.is_some() {
                continue;
            }
            self.notifier
                .send_reminder(&appointment, ReminderKind::TwentyFourHour)
                .await;
            self.appointments
                .mark_reminder_sent(appointment.id, ReminderKind::TwentyFourHour, now)
                .await?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Agendamentos de hoje que ainda não receberam o lembrete do dia.
    pub async fn run_day_of_sweep(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let today = now.date_naive();
        let mut sent = 0;
        for appointment in self.appointments.list_scheduled_for(today).await? {
            if appointment.day_of_reminder_sent_at.is_some() {
                continue;
            }
            self.notifier
                .send_reminder(&appointment, ReminderKind::DayOf)
                .await;
            self.appointments
                .mark_reminder_sent(appointment.id, ReminderKind::DayOf, now)
                .await?;
            sent += 1;
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::appointment::{NewAppointment, TimeSlot},
        services::notifications::RecordingNotifier,
    };
    use chrono::NaiveDate;

    async fn seed(store: &MemoryStore, date: NaiveDate) {
        AppointmentStore::create(
            store,
            NewAppointment {
                customer_id: None,
                full_name: "Casey Holt".to_string(),
                email: "casey@example.com".to_string(),
                phone: "555-0101".to_string(),
                address: "4 Oak Lane".to_string(),
                preferred_date: date,
                preferred_time: TimeSlot::ElevenAm,
                has_receipts_ready: false,
                notes: None,
            },
        )
        .await
        .unwrap();
    }

    fn setup() -> (ReminderService, MemoryStore, RecordingNotifier) {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        let service = ReminderService::new(Arc::new(store.clone()), Arc::new(notifier.clone()));
        (service, store, notifier)
    }

    #[tokio::test]
    async fn twenty_four_hour_sweep_is_idempotent() {
        let (service, store, notifier) = setup();
        let now = Utc::now();
        seed(&store, now.date_naive() + Days::new(1)).await;
        seed(&store, now.date_naive() + Days::new(3)).await;

        assert_eq!(service.run_24_hour_sweep(now).await.unwrap(), 1);
        assert_eq!(service.run_24_hour_sweep(now).await.unwrap(), 0);
        assert_eq!(notifier.count_of("reminder-24h"), 1);
    }

    #[tokio::test]
    async fn day_of_sweep_targets_today_only() {
        let (service, store, notifier) = setup();
        let now = Utc::now();
        seed(&store, now.date_naive()).await;
        seed(&store, now.date_naive() + Days::new(1)).await;

        assert_eq!(service.run_day_of_sweep(now).await.unwrap(), 1);
        assert_eq!(service.run_day_of_sweep(now).await.unwrap(), 0);
        assert_eq!(notifier.count_of("reminder-day-of"), 1);
        assert_eq!(notifier.count_of("reminder-24h"), 0);
    }

    #[tokio::test]
    async fn independent_flags_for_each_reminder_kind() {
        let (service, store, notifier) = setup();
        // o agendamento é amanhã: recebe o de 24h hoje e o do dia amanhã
        let now = Utc::now();
        seed(&store, now.date_naive() + Days::new(1)).await;

        assert_eq!(service.run_24_hour_sweep(now).await.unwrap(), 1);
        let tomorrow = now + chrono::Duration::days(1);
        assert_eq!(service.run_day_of_sweep(tomorrow).await.unwrap(), 1);
        assert_eq!(notifier.count_of("reminder-24h"), 1);
        assert_eq!(notifier.count_of("reminder-day-of"), 1);
    }
}
