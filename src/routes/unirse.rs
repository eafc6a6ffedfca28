use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    errors::{respuesta_ok, ApiError},
    models::roster::{ListarDeportistasQuery, UnirseInfoQuery, UnirseRequest},
    services::roster::RosterService,
    AppState,
};

/// Chequeo de elegibilidad sin mutaciones. Consultivo: la unión real
/// revalida todo del lado del servidor.
pub async fn info(
    State(state): State<AppState>,
    Query(q): Query<UnirseInfoQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let info = RosterService::info_union(&state.db, &q.code, q.id_persona)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok("Información de unión", serde_json::to_value(info).unwrap()))
}

pub async fn unirse(
    State(state): State<AppState>,
    Json(body): Json<UnirseRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ocupacion = RosterService::unirse_por_codigo(&state.db, &body.code, body.id_persona)
        .await
        .map_err(ApiError::into_respuesta)?;
    Ok(respuesta_ok(
        "Te uniste a la reserva",
        serde_json::to_value(ocupacion).unwrap(),
    ))
}

pub async fn deportistas(
    State(state): State<AppState>,
    Query(q): Query<ListarDeportistasQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (filas, ocupacion) = RosterService::listar_deportistas(
        &state.db,
        q.id_reserva,
        q.pagina.unwrap_or(1),
        q.limite.unwrap_or(20),
    )
    .await
    .map_err(ApiError::into_respuesta)?;

    Ok(respuesta_ok(
        "Deportistas de la reserva",
        json!({
            "deportistas": filas,
            "ocupacion": ocupacion,
        }),
    ))
}
