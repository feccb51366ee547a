// src/models/appointment.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Ciclo de vida do agendamento ---
//
// scheduled -> in_progress -> completed
//           \-> cancelled <-/
//
// completed e cancelled são terminais: nada mais muda depois deles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    // A matriz de transições válidas. Auto-transições são rejeitadas.
    pub fn can_transition_to(self, next: Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress) | (Scheduled, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(AppError::Validation(format!(
                "Unknown appointment status '{other}'."
            ))),
        }
    }
}

// Janelas de visita oferecidas no agendamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "time_slot")]
pub enum TimeSlot {
    #[serde(rename = "9:00 AM")]
    #[sqlx(rename = "9:00 AM")]
    NineAm,
    #[serde(rename = "11:00 AM")]
    #[sqlx(rename = "11:00 AM")]
    ElevenAm,
    #[serde(rename = "1:00 PM")]
    #[sqlx(rename = "1:00 PM")]
    OnePm,
    #[serde(rename = "3:00 PM")]
    #[sqlx(rename = "3:00 PM")]
    ThreePm,
    #[serde(rename = "5:00 PM")]
    #[sqlx(rename = "5:00 PM")]
    FivePm,
}

impl TimeSlot {
    pub fn label(self) -> &'static str {
        match self {
            Self::NineAm => "9:00 AM",
            Self::ElevenAm => "11:00 AM",
            Self::OnePm => "1:00 PM",
            Self::ThreePm => "3:00 PM",
            Self::FivePm => "5:00 PM",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "9:00 AM" => Ok(Self::NineAm),
            "11:00 AM" => Ok(Self::ElevenAm),
            "1:00 PM" => Ok(Self::OnePm),
            "3:00 PM" => Ok(Self::ThreePm),
            "5:00 PM" => Ok(Self::FivePm),
            other => Err(AppError::Validation(format!(
                "Unknown time slot '{other}'. Expected one of: 9:00 AM, 11:00 AM, 1:00 PM, 3:00 PM, 5:00 PM."
            ))),
        }
    }
}

// Uma visita de auditoria agendada.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    // NULL = agendamento de visitante (guest booking)
    pub customer_id: Option<Uuid>,
    pub officer_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[schema(value_type = String, format = Date, example = "2026-09-03")]
    pub preferred_date: NaiveDate,
    pub preferred_time: TimeSlot,
    pub status: AppointmentStatus,
    pub has_receipts_ready: bool,
    pub notes: Option<String>,
    // Carimbos das varreduras de lembrete (evitam reenvio)
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub day_of_reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    // Setado se e somente se status = completed
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: TimeSlot,
    pub has_receipts_ready: bool,
    pub notes: Option<String>,
}

// Payload de criação. Data e horário chegam como texto e são convertidos
// no serviço (erros viram 400, não 422).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    #[validate(length(min = 1, message = "Full name is required."))]
    pub full_name: String,

    #[validate(email(message = "A valid email is required."))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required."))]
    pub phone: String,

    #[validate(length(min = 1, message = "Address is required."))]
    pub address: String,

    #[schema(example = "2026-09-03")]
    pub preferred_date: String,

    #[schema(example = "1:00 PM")]
    pub preferred_time: String,

    #[serde(default)]
    pub has_receipts_ready: bool,

    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    #[schema(example = "in_progress")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignOfficerPayload {
    pub officer_id: Uuid,
}

// Qual das duas varreduras de lembrete está carimbando o envio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    TwentyFourHour,
    DayOf,
}
