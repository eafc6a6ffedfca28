use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Taxonomía de errores del API. Cada variante se traduce a un código HTTP
/// y a un `mensaje` legible; los errores de la base nunca llegan al cliente.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validacion(String),

    #[error("{0}")]
    NoEncontrado(String),

    #[error("{0}")]
    Conflicto(String),

    #[error("La reserva ya alcanzó su cupo máximo de participantes")]
    CupoLleno,

    #[error("El código QR ha expirado")]
    CodigoExpirado,

    #[error("El código QR no está activo")]
    CodigoInactivo,

    #[error("El cliente responsable no puede unirse a su propia reserva")]
    AutoUnionProhibida,

    #[error("La reserva fue cancelada")]
    ReservaCancelada,

    #[error("Ya estás unido a esta reserva")]
    YaUnido,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Envelope `{exito: false, mensaje, datos: null}` para el handler.
    pub fn into_respuesta(self) -> (StatusCode, Json<Value>) {
        let status = self.status();
        let mensaje = match &self {
            ApiError::Db(e) => {
                tracing::error!("error de base de datos: {e}");
                "Error interno del servidor".to_string()
            }
            otro => otro.to_string(),
        };
        (status, Json(json!({ "exito": false, "mensaje": mensaje, "datos": null })))
    }
}

/// Envelope de éxito `{exito: true, mensaje, datos}`.
pub fn respuesta_ok(mensaje: &str, datos: Value) -> Json<Value> {
    Json(json!({ "exito": true, "mensaje": mensaje, "datos": datos }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_por_variante() {
        assert_eq!(ApiError::NoEncontrado("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::CupoLleno.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::CodigoExpirado.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AutoUnionProhibida.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Db(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_db_no_filtra_detalles() {
        let (_, Json(cuerpo)) = ApiError::Db(sqlx::Error::RowNotFound).into_respuesta();
        assert_eq!(cuerpo["exito"], false);
        assert_eq!(cuerpo["mensaje"], "Error interno del servidor");
    }
}
