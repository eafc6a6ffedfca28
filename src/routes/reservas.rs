use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    errors::{respuesta_ok, ApiError},
    models::auth::Autenticado,
    models::reserva::{CalendarioQuery, CreateReservaRequest, UpdateReservaRequest},
    routes::requerir_espacio,
    services::reservas::ReservaService,
    AppState,
};

pub async fn crear_reserva(
    State(state): State<AppState>,
    _user: Autenticado,
    Json(body): Json<CreateReservaRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let (reserva, codigo_qr) =
        ReservaService::crear(&state.db, &body, state.config.qr_expiry_hours)
            .await
            .map_err(ApiError::into_respuesta)?;

    Ok((
        StatusCode::CREATED,
        respuesta_ok(
            "Reserva creada",
            json!({ "id_reserva": reserva.id, "codigo_qr": codigo_qr }),
        ),
    ))
}

pub async fn obtener_reserva(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id_espacio = requerir_espacio(&user)?;
    let reserva = ReservaService::obtener(&state.db, id, id_espacio)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok("Reserva", serde_json::to_value(reserva).unwrap()))
}

pub async fn actualizar_reserva(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateReservaRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id_espacio = requerir_espacio(&user)?;
    let reserva = ReservaService::actualizar(
        &state.db,
        id,
        id_espacio,
        &body,
        state.config.qr_expiry_hours,
    )
    .await
    .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok(
        "Reserva actualizada",
        serde_json::to_value(reserva).unwrap(),
    ))
}

pub async fn eliminar_reserva(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let id_espacio = requerir_espacio(&user)?;
    ReservaService::eliminar(&state.db, id, id_espacio)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok("Reserva eliminada", Value::Null))
}

pub async fn calendario(
    State(state): State<AppState>,
    _user: Autenticado,
    Query(q): Query<CalendarioQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let bloques = ReservaService::calendario(&state.db, &q)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok("Calendario", serde_json::to_value(bloques).unwrap()))
}
