pub mod health;
pub mod participa;
pub mod qr;
pub mod reservas;
pub mod solicitudes;
pub mod unirse;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::auth::Autenticado;

/// Las operaciones acotadas por espacio exigen un admin con espacio asignado.
pub fn requerir_espacio(user: &Autenticado) -> Result<Uuid, (StatusCode, Json<Value>)> {
    match (user.rol.as_str(), user.id_espacio) {
        ("admin_espacio", Some(id)) => Ok(id),
        _ => Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "exito": false, "mensaje": "Acceso denegado", "datos": null })),
        )),
    }
}

/// Personal del espacio: administradores y personal de control.
pub fn requerir_staff(user: &Autenticado) -> Result<(), (StatusCode, Json<Value>)> {
    match user.rol.as_str() {
        "admin_espacio" | "control" => Ok(()),
        _ => Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "exito": false, "mensaje": "Acceso denegado", "datos": null })),
        )),
    }
}
