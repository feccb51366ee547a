// src/services/audit_service.rs
//
// O diário de bordo da visita: itens de valor documentados pelo oficial.
// Toda mutação exige que o chamador seja o oficial atribuído ao
// agendamento pai e que este ainda esteja aberto.

use std::{str::FromStr, sync::Arc};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{AppointmentStore, AuditItemStore},
    models::{
        appointment::{Appointment, AppointmentStatus},
        audit::{
            AuditItem, AuditItemChanges, AuditProgress, CreateAuditItemPayload, ItemCategory,
            NewAuditItem, UpdateAuditItemPayload, DOCUMENTATION_TARGET,
        },
        auth::User,
    },
};

#[derive(Clone)]
pub struct AuditService {
    items: Arc<dyn AuditItemStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AuditService {
    pub fn new(items: Arc<dyn AuditItemStore>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            items,
            appointments,
        }
    }

    /// Documenta um item. Se o agendamento ainda estava `scheduled`, a
    /// primeira documentação o move automaticamente para `in_progress`.
    pub async fn add_item(
        &self,
        payload: CreateAuditItemPayload,
        caller: &User,
    ) -> Result<AuditItem, AppError> {
        payload.validate()?;

        let appointment = self
            .require_open_appointment(payload.appointment_id, caller)
            .await?;

        let category = ItemCategory::from_str(&payload.category)?;
        let estimated_value = parse_estimated_value(payload.estimated_value.as_deref())?;

        let item = self
            .items
            .create(NewAuditItem {
                appointment_id: payload.appointment_id,
                category,
                description: payload.description,
                estimated_value,
                serial_number: payload.serial_number,
                model: payload.model,
                photo_url: payload.photo_url,
                receipt_url: payload.receipt_url,
                notes: payload.notes,
            })
            .await?;

        if appointment.status == AppointmentStatus::Scheduled {
            self.appointments
                .set_status(appointment.id, AppointmentStatus::InProgress, None)
                .await?;
            tracing::info!(appointment_id = %appointment.id, "Visita iniciada (primeiro item documentado)");
        }

        Ok(item)
    }

    pub async fn list_items(&self, appointment_id: Uuid) -> Result<Vec<AuditItem>, AppError> {
        self.items.list_by_appointment(appointment_id).await
    }

    pub async fn update_item(
        &self,
        item_id: Uuid,
        payload: UpdateAuditItemPayload,
        caller: &User,
    ) -> Result<(), AppError> {
        let item = self.require_item(item_id).await?;
        self.require_open_appointment(item.appointment_id, caller)
            .await?;

        let category = match payload.category.as_deref() {
            Some(raw) => Some(ItemCategory::from_str(raw)?),
            None => None,
        };
        let estimated_value = match payload.estimated_value.as_deref() {
            Some(raw) => Some(parse_estimated_value(Some(raw))?),
            None => None,
        };

        self.items
            .update(
                item_id,
                AuditItemChanges {
                    category,
                    description: payload.description,
                    estimated_value,
                    serial_number: payload.serial_number,
                    model: payload.model,
                    photo_url: payload.photo_url,
                    receipt_url: payload.receipt_url,
                    notes: payload.notes,
                },
            )
            .await
    }

    pub async fn delete_item(&self, item_id: Uuid, caller: &User) -> Result<(), AppError> {
        let item = self.require_item(item_id).await?;
        self.require_open_appointment(item.appointment_id, caller)
            .await?;
        self.items.delete(item_id).await
    }

    /// Métrica informativa de progresso frente à meta de 15 itens. O diário
    /// aceita mais que isso sem reclamar.
    pub async fn progress(&self, appointment_id: Uuid) -> Result<AuditProgress, AppError> {
        let documented = self.items.list_by_appointment(appointment_id).await?.len() as u32;
        Ok(AuditProgress {
            documented,
            target: DOCUMENTATION_TARGET,
        })
    }

    async fn require_item(&self, item_id: Uuid) -> Result<AuditItem, AppError> {
        self.items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Audit item not found.".to_string()))
    }

    // Agendamento pai aberto + chamador é o oficial atribuído.
    async fn require_open_appointment(
        &self,
        appointment_id: Uuid,
        caller: &User,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

        if appointment.status.is_terminal() {
            return Err(AppError::Precondition(
                "Documentation is closed for completed or cancelled appointments.".to_string(),
            ));
        }
        if appointment.officer_id != Some(caller.id) {
            return Err(AppError::Permission(
                "Only the officer assigned to this appointment can document items.".to_string(),
            ));
        }
        Ok(appointment)
    }
}

// Valor vem como texto do formulário. Texto que não parseia vira 0 (o
// cliente muitas vezes não sabe o valor); negativo explícito é recusado.
fn parse_estimated_value(raw: Option<&str>) -> Result<Decimal, AppError> {
    let Some(raw) = raw else {
        return Ok(Decimal::ZERO);
    };
    let trimmed = raw.trim().trim_start_matches('$').replace(',', "");
    match Decimal::from_str(&trimmed) {
        Ok(value) if value < Decimal::ZERO => Err(AppError::Validation(
            "Estimated value cannot be negative.".to_string(),
        )),
        Ok(value) => Ok(value),
        Err(_) => Ok(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{AppointmentStore, MemoryStore, UserStore},
        models::{
            appointment::{NewAppointment, TimeSlot},
            auth::{NewUser, UserRole},
        },
    };
    use chrono::Days;

    async fn seed_officer(store: &MemoryStore) -> User {
        UserStore::create(
            store,
            NewUser {
                username: "officer".to_string(),
                password_hash: "x".to_string(),
                email: "officer@example.com".to_string(),
                full_name: "Officer Reyes".to_string(),
                phone: None,
                role: UserRole::Officer,
            })
            .await
            .unwrap()
    }

    async fn seed_appointment(store: &MemoryStore, officer_id: Uuid) -> Appointment {
        let appointment = AppointmentStore::create(
            store,
            NewAppointment {
                customer_id: None,
                full_name: "Casey Holt".to_string(),
                email: "casey@example.com".to_string(),
                phone: "555-0101".to_string(),
                address: "4 Oak Lane".to_string(),
                preferred_date: Utc::now().date_naive() + Days::new(2),
                preferred_time: TimeSlot::NineAm,
                has_receipts_ready: true,
                notes: None,
            },
        )
        .await
        .unwrap();
        store.set_officer(appointment.id, officer_id).await.unwrap();
        AppointmentStore::find_by_id(store, appointment.id)
            .await
            .unwrap()
            .unwrap()
    }

    fn item_payload(appointment_id: Uuid, value: Option<&str>) -> CreateAuditItemPayload {
        CreateAuditItemPayload {
            appointment_id,
            category: "electronics".to_string(),
            description: "55-inch OLED television".to_string(),
            estimated_value: value.map(str::to_string),
            serial_number: Some("SN-4491".to_string()),
            model: None,
            photo_url: None,
            receipt_url: None,
            notes: None,
        }
    }

    fn setup() -> (AuditService, MemoryStore) {
        let store = MemoryStore::new();
        let service = AuditService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (service, store)
    }

    #[tokio::test]
    async fn first_item_moves_appointment_to_in_progress() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let appointment = seed_appointment(&store, officer.id).await;

        service
            .add_item(item_payload(appointment.id, Some("899.99")), &officer)
            .await
            .unwrap();

        let stored = AppointmentStore::find_by_id(&store, appointment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AppointmentStatus::InProgress);
    }

    #[tokio::test]
    async fn unassigned_officer_cannot_document() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let stranger = UserStore::create(
            &store,
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
        let appointment = seed_appointment(&store, officer.id).await;

        let err = service
            .add_item(item_payload(appointment.id, None), &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Permission(_)));
    }

    #[tokio::test]
    async fn documentation_closed_on_terminal_appointment() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let appointment = seed_appointment(&store, officer.id).await;
        store
            .set_status(appointment.id, AppointmentStatus::Cancelled, None)
            .await
            .unwrap();

        let err = service
            .add_item(item_payload(appointment.id, None), &officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[tokio::test]
    async fn list_items_is_newest_first() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let appointment = seed_appointment(&store, officer.id).await;

        let mut first = item_payload(appointment.id, None);
        first.description = "Item A".to_string();
        let mut second = item_payload(appointment.id, None);
        second.description = "Item B".to_string();

        service.add_item(first, &officer).await.unwrap();
        service.add_item(second, &officer).await.unwrap();

        let items = service.list_items(appointment.id).await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(names, vec!["Item B", "Item A"]);
    }

    #[tokio::test]
    async fn update_and_delete_respect_partial_payloads() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let appointment = seed_appointment(&store, officer.id).await;

        let item = service
            .add_item(item_payload(appointment.id, Some("899.99")), &officer)
            .await
            .unwrap();

        service
            .update_item(
                item.id,
                UpdateAuditItemPayload {
                    category: Some("jewelry".to_string()),
                    description: None,
                    estimated_value: Some("1500".to_string()),
                    serial_number: None,
                    model: None,
                    photo_url: None,
                    receipt_url: None,
                    notes: None,
                },
                &officer,
            )
            .await
            .unwrap();

        let updated = service.list_items(appointment.id).await.unwrap().remove(0);
        assert_eq!(updated.category, ItemCategory::Jewelry);
        assert_eq!(updated.estimated_value, Decimal::new(1500, 0));
        // campos ausentes ficam como estavam
        assert_eq!(updated.description, "55-inch OLED television");
        assert_eq!(updated.serial_number.as_deref(), Some("SN-4491"));

        service.delete_item(item.id, &officer).await.unwrap();
        assert!(service.list_items(appointment.id).await.unwrap().is_empty());

        let err = service.delete_item(item.id, &officer).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn estimated_value_parsing_is_forgiving() {
        assert_eq!(parse_estimated_value(None).unwrap(), Decimal::ZERO);
        assert_eq!(
            parse_estimated_value(Some("$1,250.50")).unwrap(),
            Decimal::new(125050, 2)
        );
        assert_eq!(parse_estimated_value(Some("unknown")).unwrap(), Decimal::ZERO);
        assert!(parse_estimated_value(Some("-5")).is_err());
    }

    #[tokio::test]
    async fn progress_counts_against_target() {
        let (service, store) = setup();
        let officer = seed_officer(&store).await;
        let appointment = seed_appointment(&store, officer.id).await;

        for _ in 0..3 {
            service
                .add_item(item_payload(appointment.id, Some("10")), &officer)
                .await
                .unwrap();
        }

        let progress = service.progress(appointment.id).await.unwrap();
        assert_eq!(progress.documented, 3);
        assert_eq!(progress.target, 15);
    }
}
