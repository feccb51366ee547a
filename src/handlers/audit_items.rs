// src/handlers/audit_items.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{AuthenticatedUser, OfficerOnly, RequireRole},
    models::audit::{AuditItem, AuditProgress, CreateAuditItemPayload, UpdateAuditItemPayload},
};

#[utoipa::path(
    post,
    path = "/api/audit-items",
    request_body = CreateAuditItemPayload,
    responses(
        (status = 201, description = "Item documentado", body = AuditItem),
        (status = 400, description = "Categoria desconhecida, valor negativo ou agendamento encerrado"),
        (status = 403, description = "Chamador não é o oficial atribuído"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "audit-items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    officer: RequireRole<OfficerOnly>,
    Json(payload): Json<CreateAuditItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.audit_service.add_item(payload, &officer.user).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// O parâmetro aqui é o id do AGENDAMENTO, não de um item. Contrato herdado
// do serviço anterior e mantido por compatibilidade com o painel.
#[utoipa::path(
    get,
    path = "/api/audit-items/{id}",
    params(("id" = Uuid, Path, description = "Id do agendamento")),
    responses(
        (status = 200, description = "Itens do agendamento, mais recentes primeiro", body = [AuditItem]),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("api_jwt" = [])),
    tag = "audit-items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _session: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.audit_service.list_items(appointment_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/audit-items/{id}/progress",
    params(("id" = Uuid, Path, description = "Id do agendamento")),
    responses(
        (status = 200, description = "Itens documentados frente à meta de 15", body = AuditProgress),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("api_jwt" = [])),
    tag = "audit-items"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    _session: AuthenticatedUser,
    Path(appointment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let progress = state.audit_service.progress(appointment_id).await?;
    Ok(Json(progress))
}

#[utoipa::path(
    patch,
    path = "/api/audit-items/{id}",
    params(("id" = Uuid, Path, description = "Id do item")),
    request_body = UpdateAuditItemPayload,
    responses(
        (status = 200, description = "Item atualizado"),
        (status = 403, description = "Chamador não é o oficial atribuído"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "audit-items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    officer: RequireRole<OfficerOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAuditItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .audit_service
        .update_item(id, payload, &officer.user)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/audit-items/{id}",
    params(("id" = Uuid, Path, description = "Id do item")),
    responses(
        (status = 200, description = "Item removido"),
        (status = 403, description = "Chamador não é o oficial atribuído"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "audit-items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    officer: RequireRole<OfficerOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.audit_service.delete_item(id, &officer.user).await?;
    Ok(Json(json!({ "success": true })))
}
