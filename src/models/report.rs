// src/models/report.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::audit::AuditItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
pub enum ReportStatus {
    Generating,
    Completed,
    Failed,
}

// O laudo sintetizado de um agendamento concluído (1:1, garantido por
// UNIQUE em appointment_id).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub customer_id: Uuid,
    pub officer_id: Uuid,
    // Formato legível: RPT-<ano>-<6 dígitos>
    #[schema(example = "RPT-2026-481903")]
    pub report_number: String,
    pub pdf_url: Option<String>,
    pub status: ReportStatus,
    pub total_items_documented: i32,
    #[schema(value_type = String, example = "600.50")]
    pub total_estimated_value: Decimal,
    pub customer_signature: Option<String>,
    pub officer_signature: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub appointment_id: Uuid,
    pub customer_id: Uuid,
    pub officer_id: Uuid,
    pub report_number: String,
    pub status: ReportStatus,
    pub total_items_documented: i32,
    pub total_estimated_value: Decimal,
    pub metadata: Option<serde_json::Value>,
}

// Agregados calculados numa única leitura (snapshot) do conjunto de itens.
// O mesmo snapshot alimenta a linha persistida e a tabela renderizada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTotals {
    pub total_items: i32,
    pub total_value: Decimal,
    pub items_with_receipt: i32,
    pub items_with_photo: i32,
}

impl ReportTotals {
    pub fn from_items(items: &[AuditItem]) -> Self {
        Self {
            total_items: items.len() as i32,
            total_value: items.iter().map(|i| i.estimated_value).sum(),
            items_with_receipt: items.iter().filter(|i| i.receipt_url.is_some()).count() as i32,
            items_with_photo: items.iter().filter(|i| i.photo_url.is_some()).count() as i32,
        }
    }
}

// Resposta do endpoint de geração: a linha do laudo mais o PDF em base64
// (o upload definitivo para storage é responsabilidade externa).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: Report,
    pub pdf_data: String,
}
