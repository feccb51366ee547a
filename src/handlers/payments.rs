// src/handlers/payments.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AdminOnly, AuthenticatedUser, RequireRole},
    models::payment::{NewPayment, Payment, PaymentStatus, RecordPaymentPayload},
};

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = RecordPaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = [])),
    tag = "payments"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // A captura já aconteceu no provedor; aqui o registro entra concluído.
    let payment = state
        .payments
        .create(NewPayment {
            appointment_id: payload.appointment_id,
            customer_id: payload.customer_id,
            provider_payment_id: payload.provider_payment_id,
            amount: payload.amount,
            currency: payload.currency,
            service: payload.service,
            status: PaymentStatus::Completed,
            payment_method: payload.payment_method,
            processed_at: Some(Utc::now()),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    responses(
        (status = 200, description = "Histórico de pagamentos da sessão", body = [Payment]),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("api_jwt" = [])),
    tag = "payments"
)]
pub async fn list_my_payments(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.payments.list_by_customer(user.id).await?;
    Ok(Json(payments))
}
