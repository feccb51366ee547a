// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Resumo administrativo. Atenção: appointmentsToday conta pela data de
// CRIAÇÃO do agendamento, não pela data da visita (semântica herdada).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub appointments_today: i64,
    pub reports_generated: i64,
    #[schema(value_type = String, example = "1250.00")]
    pub monthly_revenue: Decimal,
    pub active_officers: i64,
}
