// src/models/audit.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// Meta de itens documentados exibida como indicador de progresso.
// É só uma referência visual: o ledger aceita mais do que isso.
pub const DOCUMENTATION_TARGET: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "item_category", rename_all = "lowercase")]
pub enum ItemCategory {
    Electronics,
    Jewelry,
    Furniture,
    Artwork,
    Appliances,
    Other,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Electronics => "Electronics",
            Self::Jewelry => "Jewelry",
            Self::Furniture => "Furniture",
            Self::Artwork => "Artwork",
            Self::Appliances => "Appliances",
            Self::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for ItemCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "electronics" => Ok(Self::Electronics),
            "jewelry" => Ok(Self::Jewelry),
            "furniture" => Ok(Self::Furniture),
            "artwork" => Ok(Self::Artwork),
            "appliances" => Ok(Self::Appliances),
            "other" => Ok(Self::Other),
            other => Err(AppError::Validation(format!(
                "Unknown item category '{other}'."
            ))),
        }
    }
}

// Um objeto de valor documentado durante a visita. Pertence a exatamente
// um agendamento.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditItem {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub category: ItemCategory,
    pub description: String,
    #[schema(value_type = String, example = "1299.99")]
    pub estimated_value: Decimal,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub photo_url: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditItem {
    pub appointment_id: Uuid,
    pub category: ItemCategory,
    pub description: String,
    pub estimated_value: Decimal,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub photo_url: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

// Campos alterados num PATCH. Ausente = mantém o valor atual.
#[derive(Debug, Clone, Default)]
pub struct AuditItemChanges {
    pub category: Option<ItemCategory>,
    pub description: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub photo_url: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

// Categoria e valor chegam como texto: categoria desconhecida é 400,
// valor não-parseável cai para 0 (comportamento permissivo herdado).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditItemPayload {
    pub appointment_id: Uuid,

    #[schema(example = "electronics")]
    pub category: String,

    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,

    #[schema(example = "1299.99")]
    pub estimated_value: Option<String>,

    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub photo_url: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuditItemPayload {
    pub category: Option<String>,
    pub description: Option<String>,
    pub estimated_value: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub photo_url: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
}

// Indicador documentados/meta que alimenta a barra de progresso do
// oficial e os metadados do laudo.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditProgress {
    pub documented: u32,
    pub target: u32,
}
