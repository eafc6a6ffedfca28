use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QrReserva {
    pub id: Uuid,
    pub id_reserva: Uuid,
    pub codigo: String,
    pub generado_en: DateTime<Utc>,
    pub expira_en: Option<DateTime<Utc>>,
    pub estado: String,
    pub verificado: bool,
    pub id_control: Option<Uuid>,
}

/// Contenido del código: base64 de este JSON. Es un identificador opaco,
/// no una credencial firmada; el control de acceso real es la expiración,
/// el estado del QR y las reglas del roster.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct QrPayload {
    pub rid: Uuid,
    pub ts: i64,
    pub nonce: String,
    pub v: u8,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegenerarQrRequest {
    #[serde(default)]
    pub forzar_nuevo: bool,
}
