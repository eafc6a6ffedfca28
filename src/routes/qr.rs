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
    models::qr::RegenerarQrRequest,
    services::qr::QrService,
    AppState,
};

pub async fn qr_por_reserva(
    State(state): State<AppState>,
    _user: Autenticado,
    Path(id_reserva): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let qr = QrService::por_reserva(&state.db, id_reserva)
        .await
        .map_err(ApiError::into_respuesta)?
        .ok_or_else(|| {
            ApiError::NoEncontrado("La reserva no tiene código QR".into()).into_respuesta()
        })?;
    Ok(respuesta_ok("Código QR", serde_json::to_value(qr).unwrap()))
}

/// Regenera el QR de la reserva. Sin cuerpo (o con `forzar_nuevo: false`)
/// conserva el código y refresca la vigencia.
pub async fn regenerar_por_reserva(
    State(state): State<AppState>,
    _user: Autenticado,
    Path(id_reserva): Path<Uuid>,
    body: Option<Json<RegenerarQrRequest>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let forzar_nuevo = body.map(|Json(b)| b.forzar_nuevo).unwrap_or(false);

    let qr = QrService::regenerar(
        &state.db,
        id_reserva,
        forzar_nuevo,
        state.config.qr_expiry_hours,
    )
    .await
    .map_err(ApiError::into_respuesta)?;

    Ok(respuesta_ok(
        "Código QR regenerado",
        serde_json::to_value(qr).unwrap(),
    ))
}
