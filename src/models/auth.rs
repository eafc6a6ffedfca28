use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims del token emitido por el servicio de autenticación (colaborador
/// externo); este backend solo los valida.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub rol: String,
    pub id_espacio: Option<Uuid>,
    pub exp: usize,
}

/// Identidad ya validada, disponible como extractor en los handlers.
#[derive(Debug, Clone)]
pub struct Autenticado {
    pub id_persona: Uuid,
    pub rol: String,
    pub id_espacio: Option<Uuid>,
}
