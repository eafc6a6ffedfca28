use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    errors::{respuesta_ok, ApiError},
    models::auth::Autenticado,
    models::solicitud::CreateSolicitudRequest,
    routes::requerir_staff,
    services::solicitudes::SolicitudService,
    AppState,
};

pub async fn crear(
    State(state): State<AppState>,
    _user: Autenticado,
    Json(body): Json<CreateSolicitudRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let solicitud = SolicitudService::crear(&state.db, &body)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok((
        StatusCode::CREATED,
        respuesta_ok("Solicitud creada", serde_json::to_value(solicitud).unwrap()),
    ))
}

pub async fn listar(
    State(state): State<AppState>,
    user: Autenticado,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    requerir_staff(&user)?;
    let solicitudes = SolicitudService::listar(&state.db)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok(
        "Solicitudes",
        serde_json::to_value(solicitudes).unwrap(),
    ))
}

pub async fn aprobar(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    requerir_staff(&user)?;
    let solicitud = SolicitudService::aprobar(&state.db, id, state.email.clone())
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok(
        "Solicitud aprobada",
        serde_json::to_value(solicitud).unwrap(),
    ))
}

pub async fn rechazar(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    requerir_staff(&user)?;
    let solicitud = SolicitudService::rechazar(&state.db, id, state.email.clone())
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok(
        "Solicitud rechazada",
        serde_json::to_value(solicitud).unwrap(),
    ))
}
