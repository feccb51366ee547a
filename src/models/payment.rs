// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

// Um pagamento por serviço cobrável. A captura em si acontece no provedor
// externo; aqui só registramos o resultado.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub provider_payment_id: Option<String>,
    #[schema(value_type = String, example = "50.00")]
    pub amount: Decimal,
    pub currency: String,
    #[schema(example = "title_protection")]
    pub service: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub appointment_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub provider_payment_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub service: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

// Registro de uma cobrança já capturada no provedor.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    pub appointment_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub provider_payment_id: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = String, example = "50.00")]
    pub amount: Decimal,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[validate(length(min = 1, message = "Service is required."))]
    pub service: String,

    pub payment_method: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}
