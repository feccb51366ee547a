// src/services/appointment_service.rs
//
// Ciclo de vida do agendamento: criação (inclusive por visitantes sem
// conta), atribuição de oficial e a máquina de estados. A matriz de
// transições mora no modelo; aqui ficam as regras de negócio em volta.

use std::{str::FromStr, sync::Arc};

use chrono::{Days, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{AppointmentStore, UserStore},
    models::{
        appointment::{
            Appointment, AppointmentStatus, CreateAppointmentPayload, NewAppointment, TimeSlot,
        },
        auth::{User, UserRole},
    },
    services::notifications::NotificationSender,
};

// Janela de agendamento: de amanhã até 7 dias à frente.
const BOOKING_WINDOW_DAYS: u64 = 7;

#[derive(Clone)]
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            appointments,
            users,
            notifier,
        }
    }

    /// Cria um agendamento. `session` vazia = visitante sem conta; nesse
    /// caso o registro fica sem vínculo com usuário.
    pub async fn create(
        &self,
        payload: CreateAppointmentPayload,
        session: Option<&User>,
    ) -> Result<Appointment, AppError> {
        payload.validate()?;

        let preferred_date = parse_preferred_date(&payload.preferred_date)?;
        let preferred_time = TimeSlot::from_str(&payload.preferred_time)?;
        self.check_booking_window(preferred_date)?;

        let appointment = self
            .appointments
            .create(NewAppointment {
                customer_id: session.map(|u| u.id),
                full_name: payload.full_name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                preferred_date,
                preferred_time,
                has_receipts_ready: payload.has_receipts_ready,
                notes: payload.notes,
            })
            .await?;

        tracing::info!(appointment_id = %appointment.id, date = %preferred_date, "✅ Agendamento criado");
        self.notifier.send_booking_confirmation(&appointment).await;
        Ok(appointment)
    }

    fn check_booking_window(&self, preferred_date: NaiveDate) -> Result<(), AppError> {
        let today = Utc::now().date_naive();
        let earliest = today + Days::new(1);
        let latest = today + Days::new(BOOKING_WINDOW_DAYS);
        if preferred_date < earliest || preferred_date > latest {
            return Err(AppError::Validation(format!(
                "Appointments must be booked between {earliest} and {latest}."
            )));
        }
        Ok(())
    }

    /// Atribui (ou reatribui) um oficial ao agendamento. A checagem de papel
    /// do chamador acontece na rota; aqui validamos o alvo.
    pub async fn assign_officer(&self, id: Uuid, officer_id: Uuid) -> Result<(), AppError> {
        let appointment = self.require_appointment(id).await?;
        if appointment.status.is_terminal() {
            return Err(AppError::Precondition(
                "Cannot assign an officer to a completed or cancelled appointment.".to_string(),
            ));
        }

        let officer = self
            .users
            .find_by_id(officer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Officer not found.".to_string()))?;
        if officer.role != UserRole::Officer || !officer.is_active {
            return Err(AppError::Precondition(
                "Target user is not an active security officer.".to_string(),
            ));
        }

        self.appointments.set_officer(id, officer_id).await?;
        tracing::info!(appointment_id = %id, officer_id = %officer_id, "✅ Oficial atribuído");

        let mut appointment = appointment;
        appointment.officer_id = Some(officer_id);
        self.notifier.send_agreement_request(&appointment).await;
        Ok(())
    }

    /// Aplica uma transição de status pedida pelo chamador. Só o admin ou o
    /// oficial atribuído podem mexer; a matriz do modelo decide o resto.
    pub async fn update_status(
        &self,
        id: Uuid,
        requested: &str,
        caller: &User,
    ) -> Result<(), AppError> {
        let next = AppointmentStatus::from_str(requested)?;
        let appointment = self.require_appointment(id).await?;

        let is_assigned_officer = appointment.officer_id == Some(caller.id);
        if caller.role != UserRole::Admin && !is_assigned_officer {
            return Err(AppError::Permission(
                "Only an admin or the assigned officer can update this appointment.".to_string(),
            ));
        }

        if !appointment.status.can_transition_to(next) {
            return Err(AppError::Precondition(format!(
                "Cannot change status from '{}' to '{}'.",
                appointment.status, next
            )));
        }

        let completed_at = (next == AppointmentStatus::Completed).then(Utc::now);
        self.appointments.set_status(id, next, completed_at).await?;
        tracing::info!(appointment_id = %id, status = %next, "✅ Status do agendamento atualizado");
        Ok(())
    }

    /// Listagem com escopo por papel: admin vê tudo, oficial vê o que lhe
    /// foi atribuído, cliente vê os próprios agendamentos.
    pub async fn list_for(&self, user: &User) -> Result<Vec<Appointment>, AppError> {
        match user.role {
            UserRole::Admin => self.appointments.list_all().await,
            UserRole::Officer => self.appointments.list_by_officer(user.id).await,
            UserRole::Homeowner => self.appointments.list_by_customer(user.id).await,
        }
    }

    async fn require_appointment(&self, id: Uuid) -> Result<Appointment, AppError> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))
    }
}

fn parse_preferred_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation("Preferred date must be in YYYY-MM-DD format.".to_string())
    })
}
