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
    models::roster::AgregarParticipanteRequest,
    routes::requerir_staff,
    services::roster::RosterService,
    AppState,
};

/// Alta de participante iniciada por el personal: mismas invariantes que la
/// unión por código, sin pasar por el QR.
pub async fn agregar(
    State(state): State<AppState>,
    user: Autenticado,
    Path(id_reserva): Path<Uuid>,
    Json(body): Json<AgregarParticipanteRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    requerir_staff(&user)?;
    let ocupacion = RosterService::agregar_por_staff(&state.db, id_reserva, body.id_persona)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok((
        StatusCode::CREATED,
        respuesta_ok(
            "Participante agregado",
            serde_json::to_value(ocupacion).unwrap(),
        ),
    ))
}

pub async fn remover(
    State(state): State<AppState>,
    user: Autenticado,
    Path((id_reserva, id_deportista)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    requerir_staff(&user)?;
    RosterService::remover(&state.db, id_reserva, id_deportista)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok("Participante removido", Value::Null))
}
