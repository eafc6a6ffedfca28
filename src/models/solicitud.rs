use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SolicitudRol {
    pub id: Uuid,
    pub id_persona: Uuid,
    pub rol_solicitado: String,
    pub estado: String,
    pub id_espacio: Option<Uuid>,
    pub creado_en: DateTime<Utc>,
    pub resuelto_en: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSolicitudRequest {
    pub id_persona: Uuid,
    pub rol_solicitado: String,
    pub id_espacio: Option<Uuid>,
}
